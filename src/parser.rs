use crate::error::{Error, Result};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reader for AsyncAPI documents written in YAML or JSON.
///
/// The whole document is loaded into a `serde_json::Value` tree; property order
/// is kept as written so rendered tables follow the document.
///
/// # Example
///
/// ```no_run
/// use asyncapi_markdown::parser::DocumentParser;
/// use std::path::Path;
///
/// let parsed = DocumentParser::parse_file(Path::new("asyncapi.yaml")).unwrap();
/// println!("Loaded {}", parsed.path.display());
/// ```
pub struct DocumentParser;

/// A successfully loaded document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Path of the source file
    pub path: PathBuf,
    /// The document tree
    pub root: Value,
}

/// Syntax a document is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Yaml,
    Json,
    Unknown,
}

impl Syntax {
    fn of(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Syntax::Yaml,
            Some("json") => Syntax::Json,
            _ => Syntax::Unknown,
        }
    }
}

impl DocumentParser {
    /// Parses a single document file.
    ///
    /// `.yaml`/`.yml` files are read as YAML and `.json` files as JSON. Any other
    /// extension is tried as JSON first, then as YAML.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the document
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The content is not valid YAML/JSON
    /// - The document is not a mapping at the top level
    pub fn parse_file(path: &Path) -> Result<ParsedDocument> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)?;
        let root = Self::parse_str(&content, Syntax::of(path)).map_err(|message| Error::Parse {
            file: path.to_path_buf(),
            message,
        })?;

        if !root.is_object() {
            return Err(Error::Parse {
                file: path.to_path_buf(),
                message: "document root must be a mapping".to_string(),
            });
        }

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedDocument {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Parses document content that did not come from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is neither JSON nor YAML.
    pub fn parse_content(content: &str) -> Result<ParsedDocument> {
        let root = Self::parse_str(content, Syntax::Unknown).map_err(|message| Error::Parse {
            file: PathBuf::from("<memory>"),
            message,
        })?;
        Ok(ParsedDocument {
            path: PathBuf::from("<memory>"),
            root,
        })
    }

    fn parse_str(content: &str, syntax: Syntax) -> std::result::Result<Value, String> {
        match syntax {
            Syntax::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Syntax::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Syntax::Unknown => serde_json::from_str(content)
                .or_else(|_| serde_yaml::from_str(content))
                .map_err(|e: serde_yaml::Error| e.to_string()),
        }
    }

    /// Parses multiple files, continuing even if some fail.
    ///
    /// Failures are logged as warnings and returned in place, so callers can still
    /// render every document that did load.
    ///
    /// # Arguments
    ///
    /// * `paths` - Slice of document paths
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedDocument>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedDocument>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
