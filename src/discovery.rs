//! Input discovery for batch export

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::image_pipeline::{ContainerKind, ConversionError, Result};

/// Name of the output directory created next to the input by default.
pub const DEFAULT_OUTPUT_DIR: &str = "tif";

/// Collects the containers to export from `input`.
///
/// A file is returned as-is if its extension is supported. A directory is
/// scanned for supported files (recursively if asked), optionally keeping only
/// names that contain `pattern`; unsupported files are skipped.
pub fn discover_inputs(
    input: &Path,
    recursive: bool,
    pattern: Option<&str>,
) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        ContainerKind::from_path(input)?;
        return Ok(vec![input.to_path_buf()]);
    }

    if !input.is_dir() {
        return Err(ConversionError::InputReadError(format!(
            "{}: no such file or directory",
            input.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();

    for entry in WalkDir::new(input).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || ContainerKind::from_path(entry.path()).is_err() {
            continue;
        }
        let matches = pattern.is_none_or(|p| entry.file_name().to_string_lossy().contains(p));
        if matches {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

/// `<input>/tif` for a directory, `<parent>/tif` for a file.
pub fn default_output_dir(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join(DEFAULT_OUTPUT_DIR)
    } else {
        input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUTPUT_DIR)
    }
}
