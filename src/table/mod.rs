pub mod types;
pub mod loader;
pub mod exporter;
pub mod report;

// Re-export main types and functions for easier access
pub use types::{Table, ColumnMapping};
pub use loader::{TableLoader, LoadedTable};
pub use exporter::{TableExporter, ExportFormat};
pub use report::{RunReport, save_reports};
