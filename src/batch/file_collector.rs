use std::path::{Path, PathBuf};
use anyhow::{Result, bail};
use log::{debug, trace};
use walkdir::WalkDir;

use crate::table::TableLoader;

/// File collector for finding pipeline exports
#[derive(Debug, Default)]
pub struct FileCollector {
    /// Skip files whose stem ends with this suffix, so earlier outputs are not re-read
    skip_suffix: Option<String>,
}

impl FileCollector {
    /// Create a new file collector with default settings
    pub fn new() -> Self {
        Self { skip_suffix: None }
    }

    /// Create a file collector that ignores files ending in `suffix`
    pub fn skipping_suffix(suffix: impl Into<String>) -> Self {
        Self { skip_suffix: Some(suffix.into()) }
    }

    /// Input tables under a path; a file is returned as-is
    pub fn collect(&self, input: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }
        if !input.is_dir() {
            bail!("Input path does not exist: {}", input.display());
        }
        self.collect_files(input)
    }

    /// Collect all readable tables from the input directory, sorted by path
    pub fn collect_files(&self, input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let input_dir = input_dir.as_ref();
        debug!("Collecting files from directory: {}", input_dir.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !TableLoader::supports(path) || self.is_skipped(path) {
                continue;
            }
            trace!("Found file: {}", path.display());
            files.push(path.to_owned());
        }

        files.sort();
        debug!("Collected {} files for processing", files.len());
        Ok(files)
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Some(suffix) = &self.skip_suffix else {
            return false;
        };
        let is_lock_file = path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("~$"));
        let has_suffix = path.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with(suffix.as_str()));
        is_lock_file || has_suffix
    }
}
