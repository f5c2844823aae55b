use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Result, Context};
use log::debug;

/// Create a directory if it doesn't exist
pub fn ensure_dir_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() && !dir.exists() {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Check if a file has a specific extension
pub fn has_extension(path: impl AsRef<Path>, extension: &str) -> bool {
    let path = path.as_ref();
    if let Some(ext) = path.extension() {
        if let Some(ext_str) = ext.to_str() {
            return ext_str.eq_ignore_ascii_case(extension);
        }
    }
    false
}

/// Check if a file has one of the specified extensions
pub fn has_any_extension(path: impl AsRef<Path>, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| has_extension(path.as_ref(), ext))
}

/// Sibling path of `input` named `<stem><suffix>.<extension>`, inside `dir` when given
pub fn derived_path(input: impl AsRef<Path>, dir: Option<&Path>, suffix: &str, extension: &str) -> PathBuf {
    let input = input.as_ref();
    let stem = input.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pipeline".to_string());
    let file_name = format!("{}{}.{}", stem, suffix, extension);

    match dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Read a file to string with better error handling
pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))
}

/// Write a string to a file with better error handling
pub fn write_string_to_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension("Pipeline.XLSX", "xlsx"));
        assert!(!has_extension("pipeline", "xlsx"));
        assert!(has_any_extension("pipeline.csv", &["xlsx", "csv"]));
    }

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path("exports/q3.csv", None, "_cleaned", "xlsx"),
            PathBuf::from("exports/q3_cleaned.xlsx")
        );
        assert_eq!(
            derived_path("exports/q3.csv", Some(Path::new("out")), "_cleaned", "csv"),
            PathBuf::from("out/q3_cleaned.csv")
        );
    }
}
