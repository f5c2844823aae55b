mod pipeline_processor;
mod stats;

// Re-export from submodules
pub use pipeline_processor::PipelineProcessor;
pub use stats::{PipelineSummary, rule_counts};
