use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::YearWindow;

// Bare four-digit year, filtered against the plausible window after matching
static FULL_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})\b").unwrap()
});

// Month name or abbreviation followed by a two-digit year: "Oct 24", "sept25"
static MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s?(\d{2})\b"
    ).unwrap()
});

// Four-digit year right after a month match, as in "Oct 15, 2025": the two digits were a day
static DAY_THEN_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^,?\s*\d{4}\b").unwrap()
});

// Slash followed by a two-digit year that closes the date: "10/25" but not "10/15/25"'s "/15"
static SLASH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(\d{2})(?:[^/\d]|$)").unwrap()
});

/// Literal cell values that stand for a missing note
const MISSING_MARKERS: [&str; 3] = ["nan", "none", "null"];

/// Shape of a date token found in a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateTokenKind {
    FullYear,
    MonthYear,
    SlashYear,
}

/// A date token and where it starts in the first note line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken {
    pub offset: usize,
    pub kind: DateTokenKind,
    pub year: i32,
}

/// Extracts the reference year of the newest note in a free-text update log
#[derive(Debug, Clone)]
pub struct DateSignalExtractor {
    window: YearWindow,
}

impl DateSignalExtractor {
    pub fn new(window: YearWindow) -> Self {
        Self { window }
    }

    /// Year of the first date token on the first line of the notes, if any
    pub fn extract_reference_year(&self, notes: Option<&str>) -> Option<i32> {
        let line = first_line(notes)?;

        let year = self.tokens(line)
            .into_iter()
            .min_by_key(|token| (token.offset, token.kind))
            .map(|token| token.year);

        trace!("Reference year {:?} from note line {:?}", year, line);
        year
    }

    /// All date tokens on a line, unordered
    pub fn tokens(&self, line: &str) -> Vec<DateToken> {
        let mut tokens = Vec::new();

        for cap in FULL_YEAR_RE.captures_iter(line) {
            let m = cap.get(1).unwrap();
            if let Ok(year) = m.as_str().parse::<i32>() {
                if self.window.contains(year) {
                    tokens.push(DateToken { offset: m.start(), kind: DateTokenKind::FullYear, year });
                }
            }
        }

        for cap in MONTH_YEAR_RE.captures_iter(line) {
            let whole = cap.get(0).unwrap();
            if DAY_THEN_YEAR_RE.is_match(&line[whole.end()..]) {
                continue;
            }
            if let Some(year) = two_digit_year(&cap[1]) {
                tokens.push(DateToken { offset: whole.start(), kind: DateTokenKind::MonthYear, year });
            }
        }

        for cap in SLASH_YEAR_RE.captures_iter(line) {
            let whole = cap.get(0).unwrap();
            if let Some(year) = two_digit_year(&cap[1]) {
                tokens.push(DateToken { offset: whole.start(), kind: DateTokenKind::SlashYear, year });
            }
        }

        tokens
    }
}

impl Default for DateSignalExtractor {
    fn default() -> Self {
        Self::new(YearWindow::default())
    }
}

/// First line of a note, or None when the note is missing
fn first_line(notes: Option<&str>) -> Option<&str> {
    let notes = notes?.trim();
    if notes.is_empty() || MISSING_MARKERS.iter().any(|m| notes.eq_ignore_ascii_case(m)) {
        return None;
    }

    notes.lines().next()
}

fn two_digit_year(digits: &str) -> Option<i32> {
    digits.parse::<i32>().ok().map(|yy| 2000 + yy)
}
