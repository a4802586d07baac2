//! Output file naming and writing.
//!
//! A single document is written under the configured file name; documents found
//! by a directory scan are named after their source file so several of them can
//! share one output directory.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the generated Markdown file.
pub const DEFAULT_OUT_FILENAME: &str = "asyncapi.md";

/// Output path of a document found by a directory scan: `<dir>/<stem>.md`.
///
/// # Arguments
///
/// * `output_dir` - Directory receiving the Markdown files
/// * `source` - Path of the AsyncAPI document
///
/// # Example
///
/// ```
/// use asyncapi_markdown::output::scanned_output_path;
/// use std::path::Path;
///
/// let path = scanned_output_path(Path::new("docs"), Path::new("specs/streetlights.yaml"));
/// assert_eq!(path, Path::new("docs/streetlights.md"));
/// ```
pub fn scanned_output_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asyncapi".to_string());
    output_dir.join(format!("{}.md", stem))
}

/// Writes the rendered Markdown to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Missing
/// parent directories are created.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
