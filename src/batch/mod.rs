mod file_collector;
mod progress;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::{error, info};

use crate::classify::processor::{PipelineProcessor, PipelineSummary, rule_counts};
use crate::table::{ExportFormat, RunReport, TableExporter, TableLoader};
use crate::utils::file_utils;

// Re-export from submodules
pub use file_collector::FileCollector;
pub use progress::ProgressTracker;

/// Suffix appended to the stem of each cleaned table
pub const OUTPUT_SUFFIX: &str = "_cleaned";

/// Where cleaned tables are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Next to each input as `<stem>_cleaned.<ext>`
    BesideInput,

    /// Inside a directory as `<stem>_cleaned.<ext>`, keeping each input's
    /// subfolder relative to the input root
    Directory(PathBuf),

    /// Exactly this file; only valid for a single input
    File(PathBuf),
}

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output: OutputTarget,
    pub format: ExportFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output: OutputTarget::BesideInput,
            format: ExportFormat::Xlsx,
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One report per successfully processed table
    pub reports: Vec<RunReport>,

    /// Counts across every processed table
    pub summary: PipelineSummary,

    /// Tables that could not be processed, with the error
    pub failures: Vec<(PathBuf, String)>,
}

/// Loads, classifies and exports each input table independently
#[derive(Debug)]
pub struct BatchRunner {
    options: BatchOptions,
    processor: PipelineProcessor,
    loader: TableLoader,
    exporter: TableExporter,
    collector: FileCollector,
    progress_tracker: ProgressTracker,
}

impl BatchRunner {
    pub fn new(processor: PipelineProcessor, options: BatchOptions) -> Self {
        Self {
            options,
            processor,
            loader: TableLoader::new(),
            exporter: TableExporter::new(),
            collector: FileCollector::skipping_suffix(OUTPUT_SUFFIX),
            progress_tracker: ProgressTracker::new(),
        }
    }

    /// Process a table file or every table under a directory
    pub fn run(&self, input: impl AsRef<Path>) -> Result<BatchOutcome> {
        let input = input.as_ref();
        let files = self.collector.collect(input)?;
        info!("Found {} tables to process under {}", files.len(), input.display());

        if files.len() > 1 && matches!(self.options.output, OutputTarget::File(_)) {
            bail!("An output file can only be used with a single input table");
        }

        let outputs = self.plan_outputs(input, &files)?;

        let results = self.progress_tracker.track_path_progress(&files, |file| {
            (file.clone(), self.process_file(file, &outputs[file]))
        });

        let mut outcome = BatchOutcome::default();
        for (file, result) in results {
            match result {
                Ok(report) => {
                    outcome.summary.merge(&report.summary);
                    outcome.reports.push(report);
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", file.display(), e);
                    outcome.failures.push((file, format!("{:#}", e)));
                }
            }
        }

        info!("Processed {} tables, {} failed", outcome.reports.len(), outcome.failures.len());
        Ok(outcome)
    }

    /// Output path for every input, refusing runs where two inputs would share one
    fn plan_outputs(&self, root: &Path, files: &[PathBuf]) -> Result<HashMap<PathBuf, PathBuf>> {
        let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
        let mut outputs = HashMap::with_capacity(files.len());

        for file in files {
            let output = self.output_path(root, file);
            if let Some(previous) = claimed.insert(output.clone(), file) {
                bail!(
                    "{} and {} would both be written to {}",
                    previous.display(),
                    file.display(),
                    output.display()
                );
            }
            outputs.insert(file.clone(), output);
        }

        Ok(outputs)
    }

    /// Classify a single table and write its cleaned copy to `output`
    pub fn process_file(&self, file: &Path, output: &Path) -> Result<RunReport> {
        let loaded = self.loader.load(file)?;
        let records = loaded.table.records(&loaded.mapping);

        let results = self.processor.process(&records);
        let summary = self.processor.summarize(&results);

        let augmented = self.exporter.augment(&loaded.table, &results)?;
        self.exporter.export(&augmented, &summary, output, self.options.format)?;

        RunReport::new(file, Some(output.to_path_buf()), summary, rule_counts(&results))
    }

    /// Output file for an input table found under `root`
    pub fn output_path(&self, root: &Path, input: &Path) -> PathBuf {
        let extension = self.options.format.extension();
        match &self.options.output {
            OutputTarget::BesideInput => file_utils::derived_path(input, None, OUTPUT_SUFFIX, extension),
            OutputTarget::Directory(dir) => {
                let subfolder = input.strip_prefix(root).ok()
                    .and_then(Path::parent)
                    .unwrap_or_else(|| Path::new(""));
                file_utils::derived_path(input, Some(&dir.join(subfolder)), OUTPUT_SUFFIX, extension)
            }
            OutputTarget::File(path) => path.clone(),
        }
    }
}
