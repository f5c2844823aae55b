pub mod types;
pub mod date_signal;
pub mod region;
pub mod status;
pub mod processor;

// Re-export the main API for easier access
pub use types::{OpportunityRecord, ClassificationResult, StatusLabel, RegionLabel, StatusRule};
pub use date_signal::DateSignalExtractor;
pub use region::RegionClassifier;
pub use status::StatusClassifier;
pub use processor::{PipelineProcessor, PipelineSummary};
