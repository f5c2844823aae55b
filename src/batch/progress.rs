use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for displaying progress across input files
#[derive(Debug, Default)]
pub struct ProgressTracker {}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new() -> Self {
        Self {}
    }

    /// Run an operation on each path in order, with a progress bar for multi-file runs
    pub fn track_path_progress<F, R>(&self, paths: &[PathBuf], mut operation: F) -> Vec<R>
    where
        F: FnMut(&PathBuf) -> R,
    {
        let progress_bar = if paths.len() > 1 {
            let pb = ProgressBar::new(paths.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            pb.set_style(style);
            Some(pb)
        } else {
            None
        };

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(pb) = &progress_bar {
                if let Some(file_name) = path.file_name() {
                    pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                }
            }

            results.push(operation(path));

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Processing complete");
        }

        results
    }
}
