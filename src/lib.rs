pub mod classify;
pub mod config;
pub mod table;
pub mod batch;
pub mod utils;

// Re-export main types and functions for easier access
pub use classify::types::{OpportunityRecord, ClassificationResult, StatusLabel, RegionLabel, StatusRule, ProcessOptions};
pub use classify::{DateSignalExtractor, RegionClassifier, StatusClassifier};
pub use classify::processor::{PipelineProcessor, PipelineSummary};
pub use config::{ClassifierConfig, RegionTable, YearWindow};

pub use table::{Table, ColumnMapping, TableLoader, TableExporter, ExportFormat, RunReport};
pub use batch::{BatchRunner, BatchOptions, BatchOutcome, OutputTarget};

// Re-export utility functions
pub use utils::file_utils;
