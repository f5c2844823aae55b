use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::classify::types::OpportunityRecord;

/// Raw table of string cells as read from a pipeline export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Trimmed header cells
    pub headers: Vec<String>,

    /// Data rows; short rows are treated as blank-padded
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at a row and column, empty when the row is short
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows.get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index of a header, compared case-insensitively
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(header))
    }

    /// Build one record per row using the detected columns
    pub fn records(&self, mapping: &ColumnMapping) -> Vec<OpportunityRecord> {
        (0..self.rows.len())
            .map(|row| {
                let field = |column: Option<usize>| column
                    .map(|c| self.cell(row, c).trim())
                    .filter(|value| !value.is_empty())
                    .map(str::to_string);

                OpportunityRecord {
                    name: field(mapping.name).unwrap_or_default(),
                    notes: field(mapping.notes),
                    proposal_age_bucket: field(mapping.proposal_age),
                    country: field(mapping.country),
                }
            })
            .collect()
    }
}

/// Columns holding each logical record field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name: Option<usize>,
    pub notes: Option<usize>,
    pub proposal_age: Option<usize>,
    pub country: Option<usize>,
}

impl ColumnMapping {
    /// Detect record columns from header text
    pub fn detect(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |pred: &dyn Fn(&str) -> bool| lowered.iter().position(|h| pred(h.as_str()));

        let mapping = Self {
            name: find(&|h| h.contains("opportunity name")).or_else(|| find(&|h| h == "name")),
            notes: find(&|h| h.contains("description") || h.contains("notes")),
            proposal_age: find(&|h| has_word(h, "age") && h.contains("proposal"))
                .or_else(|| find(&|h| has_word(h, "age"))),
            country: find(&|h| h.contains("country")),
        };

        for (field, column) in [
            ("opportunity name", mapping.name),
            ("notes", mapping.notes),
            ("proposal age", mapping.proposal_age),
            ("country", mapping.country),
        ] {
            match column {
                Some(index) => debug!("Using column {:?} for {}", headers[index], field),
                None => warn!("No {} column found; values treated as missing", field),
            }
        }

        mapping
    }
}

fn has_word(header: &str, word: &str) -> bool {
    header.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}
