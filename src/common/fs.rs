use std::{fs, path::Path};

use anyhow::{Context, Result};

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("[common::fs] Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("[common::fs] Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Make an institution name usable as a file name component (`/` and `\` become `_`).
pub(crate) fn sanitize_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
