use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, Context};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Serialize, Deserialize};

use crate::classify::processor::PipelineSummary;
use crate::utils::{file_utils, hash_utils};

/// Record of one classification run over a source table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Table that was classified
    pub source: PathBuf,

    /// SHA-256 of the source file contents
    pub source_sha256: String,

    /// Where the augmented table was written
    pub output: Option<PathBuf>,

    /// When the run finished
    pub generated_at: DateTime<Utc>,

    /// Status and region counts
    pub summary: PipelineSummary,

    /// Records per deciding rule
    pub rule_counts: BTreeMap<String, usize>,
}

impl RunReport {
    /// Build a report for a classified source file
    pub fn new(
        source: impl AsRef<Path>,
        output: Option<PathBuf>,
        summary: PipelineSummary,
        rule_counts: BTreeMap<String, usize>,
    ) -> Result<Self> {
        let source = source.as_ref();
        Ok(Self {
            source: source.to_path_buf(),
            source_sha256: hash_utils::hash_file(source)?,
            output,
            generated_at: Utc::now(),
            summary,
            rule_counts,
        })
    }
}

/// Write run reports as pretty JSON
pub fn save_reports(reports: &[RunReport], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let content = serde_json::to_string_pretty(reports)
        .context("Failed to serialize run report")?;
    file_utils::write_string_to_file(path, &content)?;

    info!("Saved run report for {} tables to {}", reports.len(), path.display());
    Ok(())
}
