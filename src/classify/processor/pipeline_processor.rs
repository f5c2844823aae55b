use log::{debug, info, warn};
use rayon::prelude::*;

use crate::classify::region::RegionClassifier;
use crate::classify::status::StatusClassifier;
use crate::classify::types::{ClassificationResult, OpportunityRecord, ProcessOptions};
use crate::config::ClassifierConfig;
use super::stats::PipelineSummary;

/// Classifies every record of a table
#[derive(Debug, Clone)]
pub struct PipelineProcessor {
    /// Processing options
    options: ProcessOptions,

    /// Status rule cascade
    status: StatusClassifier,

    /// Country to region lookup
    region: RegionClassifier,
}

impl PipelineProcessor {
    /// Create a processor from a classifier configuration
    pub fn new(config: &ClassifierConfig, options: ProcessOptions) -> Self {
        Self {
            options,
            status: StatusClassifier::new(config),
            region: RegionClassifier::new(&config.region_table, config.fuzzy_match_cutoff),
        }
    }

    /// Create a processor with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(&ClassifierConfig::default(), ProcessOptions::default())
    }

    /// Classify a single record
    pub fn classify(&self, record: &OpportunityRecord) -> ClassificationResult {
        let decision = self.status.decide(
            &record.name,
            record.notes.as_deref(),
            record.proposal_age_bucket.as_deref(),
        );

        ClassificationResult {
            status: decision.status,
            region: self.region.classify_region(record.country.as_deref()),
            rule: decision.rule,
            reference_year: decision.reference_year,
        }
    }

    /// Classify all records, one result per record in input order
    pub fn process(&self, records: &[OpportunityRecord]) -> Vec<ClassificationResult> {
        info!("Classifying {} records", records.len());

        if records.len() < self.options.min_parallel_records {
            return records.iter().map(|record| self.classify(record)).collect();
        }

        let thread_count = self.options.parallel_threads.unwrap_or_else(|| {
            let available = num_cpus::get();
            let used = std::cmp::max(1, available.saturating_sub(1));
            debug!("Using {} threads for classification (available: {})", used, available);
            used
        });

        match rayon::ThreadPoolBuilder::new().num_threads(thread_count).build() {
            Ok(pool) => pool.install(|| {
                records.par_iter()
                    .map(|record| self.classify(record))
                    .collect()
            }),
            Err(e) => {
                warn!("Failed to build thread pool, classifying sequentially: {}", e);
                records.iter().map(|record| self.classify(record)).collect()
            }
        }
    }

    /// Tally a classification pass
    pub fn summarize(&self, results: &[ClassificationResult]) -> PipelineSummary {
        let summary = PipelineSummary::from_results(results);
        info!("Classified {} records, {} on hold", summary.total, summary.hold_count());
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::types::{RegionLabel, StatusLabel};

    fn scenario() -> Vec<OpportunityRecord> {
        vec![
            OpportunityRecord::named("Acme (Hold)").with_notes("2026"),
            OpportunityRecord::named("Beta Direct").with_age("0-3 Months"),
            OpportunityRecord::named("Gamma CRO").with_notes("Jan 24 status check"),
            OpportunityRecord::named("Delta Direct").with_notes("Oct 25 renewal"),
        ]
    }

    #[test]
    fn test_end_to_end_statuses() {
        let processor = PipelineProcessor::with_defaults();
        let statuses: Vec<StatusLabel> = processor.process(&scenario())
            .iter()
            .map(|r| r.status)
            .collect();

        assert_eq!(statuses, vec![
            StatusLabel::OnHold,
            StatusLabel::Active,
            StatusLabel::CroUpdateNeeded,
            StatusLabel::Active,
        ]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records: Vec<OpportunityRecord> = (0..2000)
            .map(|i| {
                let record = OpportunityRecord::named(format!("Deal {} Direct", i));
                match i % 4 {
                    0 => record.with_notes("Oct 25 renewal").with_country("Japan"),
                    1 => record.with_notes("Jan 24").with_country("Untied States"),
                    2 => record.with_age("3-6 Months"),
                    _ => record.with_country("Mars"),
                }
            })
            .collect();

        let sequential = PipelineProcessor::new(&ClassifierConfig::default(), ProcessOptions {
            min_parallel_records: usize::MAX,
            ..ProcessOptions::default()
        });
        let parallel = PipelineProcessor::new(&ClassifierConfig::default(), ProcessOptions {
            parallel_threads: Some(4),
            min_parallel_records: 0,
        });

        let expected = sequential.process(&records);
        let actual = parallel.process(&records);
        assert_eq!(actual.len(), records.len());
        assert_eq!(actual, expected);
        assert_eq!(actual[1].region, RegionLabel::Us);
        assert_eq!(actual[3].region, RegionLabel::RestOfWorld);
    }

    #[test]
    fn test_summarize() {
        let processor = PipelineProcessor::with_defaults();
        let results = processor.process(&scenario());
        let summary = processor.summarize(&results);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.status_count(StatusLabel::Active), 2);
        assert_eq!(summary.hold_count(), 1);
        assert_eq!(summary.region_count(RegionLabel::MissingCountry), 4);
    }

    #[test]
    fn test_empty_table() {
        let processor = PipelineProcessor::with_defaults();
        let results = processor.process(&[]);
        assert!(results.is_empty());
        assert_eq!(processor.summarize(&results).total, 0);
    }
}
