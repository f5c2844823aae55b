use std::path::Path;
use std::fs;
use anyhow::{Result, Context};
use sha2::{Sha256, Digest};
use log::trace;

/// Calculate SHA-256 hash of a byte slice
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Calculate SHA-256 hash of a file, text or binary
pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    trace!("Calculating hash for file: {}", path.display());

    let content = fs::read(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    Ok(hash_bytes(&content))
}
