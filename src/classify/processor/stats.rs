use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::classify::types::{ClassificationResult, RegionLabel, StatusLabel, StatusRule};

/// Tally of a classification pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total number of records classified
    pub total: usize,

    /// Records per status, every status present
    pub status_counts: BTreeMap<StatusLabel, usize>,

    /// Records per region, every region present
    pub region_counts: BTreeMap<RegionLabel, usize>,
}

impl Default for PipelineSummary {
    fn default() -> Self {
        Self {
            total: 0,
            status_counts: StatusLabel::ALL.iter().map(|s| (*s, 0)).collect(),
            region_counts: RegionLabel::ALL.iter().map(|r| (*r, 0)).collect(),
        }
    }
}

impl PipelineSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the results of a classification pass
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut summary = Self::new();
        for result in results {
            summary.record(result);
        }
        summary
    }

    /// Count a single result
    pub fn record(&mut self, result: &ClassificationResult) {
        self.total += 1;
        *self.status_counts.entry(result.status).or_insert(0) += 1;
        *self.region_counts.entry(result.region).or_insert(0) += 1;
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &Self) {
        self.total += other.total;
        for (status, count) in &other.status_counts {
            *self.status_counts.entry(*status).or_insert(0) += count;
        }
        for (region, count) in &other.region_counts {
            *self.region_counts.entry(*region).or_insert(0) += count;
        }
    }

    pub fn status_count(&self, status: StatusLabel) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    pub fn region_count(&self, region: RegionLabel) -> usize {
        self.region_counts.get(&region).copied().unwrap_or(0)
    }

    /// Number of records on hold
    pub fn hold_count(&self) -> usize {
        self.status_count(StatusLabel::OnHold)
    }

    /// Percentage of records needing an update from sales
    pub fn update_needed_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let needed = self.status_count(StatusLabel::DirectUpdateNeeded)
            + self.status_count(StatusLabel::CroUpdateNeeded);
        (needed as f64 / self.total as f64) * 100.0
    }
}

/// Records per deciding rule, for tuning the cascade
pub fn rule_counts(results: &[ClassificationResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        let key = match result.rule {
            StatusRule::HoldOverride => "hold_override",
            StatusRule::NewProposalBypass => "new_proposal_bypass",
            StatusRule::FreshNote => "fresh_note",
            StatusRule::UpdateFallback => "update_fallback",
        };
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}
