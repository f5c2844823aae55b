use log::trace;

use crate::classify::date_signal::DateSignalExtractor;
use crate::classify::types::{StatusLabel, StatusRule};
use crate::config::ClassifierConfig;

/// Rules in precedence order; the first rule that yields a status wins
pub const RULE_ORDER: [StatusRule; 4] = [
    StatusRule::HoldOverride,
    StatusRule::NewProposalBypass,
    StatusRule::FreshNote,
    StatusRule::UpdateFallback,
];

/// Outcome of running the cascade over one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDecision {
    pub status: StatusLabel,
    pub rule: StatusRule,
    pub reference_year: Option<i32>,
}

/// Record fields the cascade reads, with lazily extracted reference year
struct RuleInput<'a> {
    name: String,
    notes: Option<&'a str>,
    age_bucket: Option<&'a str>,
    reference_year: Option<Option<i32>>,
}

/// Applies the ordered status rules to an opportunity
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    extractor: DateSignalExtractor,
    freshness_threshold_year: i32,
    active_age_buckets: Vec<String>,
    hold_marker: String,
    direct_marker: String,
}

impl StatusClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            extractor: DateSignalExtractor::new(config.plausible_year_window),
            freshness_threshold_year: config.freshness_threshold_year,
            active_age_buckets: config.active_age_buckets.iter()
                .map(|bucket| normalize_age_bucket(bucket))
                .collect(),
            hold_marker: config.hold_marker.to_lowercase(),
            direct_marker: config.direct_marker.to_lowercase(),
        }
    }

    /// Status of an opportunity
    pub fn classify_status(&self, name: &str, notes: Option<&str>, proposal_age_bucket: Option<&str>) -> StatusLabel {
        self.decide(name, notes, proposal_age_bucket).status
    }

    /// Status of an opportunity along with the rule that decided it
    pub fn decide(&self, name: &str, notes: Option<&str>, proposal_age_bucket: Option<&str>) -> StatusDecision {
        let mut input = RuleInput {
            name: name.to_lowercase(),
            notes,
            age_bucket: proposal_age_bucket,
            reference_year: None,
        };

        for rule in RULE_ORDER {
            if let Some(status) = self.evaluate(rule, &mut input) {
                trace!("{:?} -> {:?} via {:?}", name, status, rule);
                return StatusDecision {
                    status,
                    rule,
                    reference_year: input.reference_year.flatten(),
                };
            }
        }

        StatusDecision {
            status: self.fallback_status(&input.name),
            rule: StatusRule::UpdateFallback,
            reference_year: input.reference_year.flatten(),
        }
    }

    fn fallback_status(&self, lowered_name: &str) -> StatusLabel {
        if lowered_name.contains(&self.direct_marker) {
            StatusLabel::DirectUpdateNeeded
        } else {
            StatusLabel::CroUpdateNeeded
        }
    }

    /// Run a single rule; None means the rule does not apply
    fn evaluate(&self, rule: StatusRule, input: &mut RuleInput<'_>) -> Option<StatusLabel> {
        match rule {
            StatusRule::HoldOverride => input.name
                .contains(&self.hold_marker)
                .then_some(StatusLabel::OnHold),

            StatusRule::NewProposalBypass => input.age_bucket
                .map(normalize_age_bucket)
                .filter(|bucket| self.active_age_buckets.contains(bucket))
                .map(|_| StatusLabel::Active),

            StatusRule::FreshNote => {
                let notes = input.notes;
                let year = *input.reference_year
                    .get_or_insert_with(|| self.extractor.extract_reference_year(notes));
                year.filter(|year| *year >= self.freshness_threshold_year)
                    .map(|_| StatusLabel::Active)
            }

            StatusRule::UpdateFallback => Some(self.fallback_status(&input.name)),
        }
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

/// Canonical form of an age bucket: "0-3 Months", "0 to 3 months" and "0 – 3 month" all agree
pub fn normalize_age_bucket(bucket: &str) -> String {
    let spaced = bucket.to_lowercase()
        .replace(['-', '\u{2013}', '\u{2014}'], " to ");

    spaced.split_whitespace()
        .map(|word| match word {
            "month" | "mo" | "mos" | "mths" => "months",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
