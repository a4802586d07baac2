use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions of files that may hold an AsyncAPI document.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Directories never worth descending into.
const SKIPPED_DIRECTORIES: [&str; 2] = ["target", "node_modules"];

/// File scanner for collecting AsyncAPI documents from a directory tree.
///
/// The `FileScanner` recursively walks a directory looking for YAML and JSON files.
/// Hidden directories (those starting with `.`), `target` and `node_modules` are skipped.
///
/// # Example
///
/// ```no_run
/// use asyncapi_markdown::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./specs"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} documents", result.document_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Paths of all `.yaml`, `.yml` and `.json` files, sorted
    pub document_files: Vec<PathBuf>,
    /// Warning messages for paths that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The directory to scan for documents
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects candidate document files.
    ///
    /// Entries that cannot be read are logged and recorded as warnings; the scan
    /// carries on with the rest of the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut document_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| e.path() == self.root_path || !is_skipped(e.path()))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_document_file(path) {
                        document_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        document_files.sort();

        Ok(ScanResult {
            document_files,
            warnings,
        })
    }
}

fn is_skipped(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    file_name.starts_with('.')
        || (path.is_dir() && SKIPPED_DIRECTORIES.contains(&file_name.as_ref()))
}

/// Whether the path has a YAML or JSON extension.
pub fn is_document_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
