use crate::error::{Error, Result};
use crate::parser::ParsedDocument;
use log::debug;
use serde_json::Value;

/// Major AsyncAPI version a document is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    /// 2.x: operations live under channels as `publish` / `subscribe`
    V2,
    /// 3.x: top-level `operations` referencing channels
    V3,
}

/// Version detector for loaded AsyncAPI documents.
///
/// The version is read from the top-level `asyncapi` field. Only the major part
/// matters: every `2.x.y` release shares one document layout, and so does `3.x.y`.
pub struct VersionDetector;

impl VersionDetector {
    /// Detects the version of a parsed document.
    ///
    /// # Example
    ///
    /// ```
    /// use asyncapi_markdown::detector::{SpecVersion, VersionDetector};
    /// use asyncapi_markdown::parser::DocumentParser;
    ///
    /// let parsed = DocumentParser::parse_content("asyncapi: 2.6.0").unwrap();
    /// assert_eq!(VersionDetector::detect(&parsed).unwrap(), SpecVersion::V2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] when the field is missing or names a
    /// version other than 2.x or 3.x.
    pub fn detect(document: &ParsedDocument) -> Result<SpecVersion> {
        let version = Self::detect_root(&document.root)?;
        debug!(
            "Detected AsyncAPI {:?} in {}",
            version,
            document.path.display()
        );
        Ok(version)
    }

    /// Same as [`VersionDetector::detect`] for a bare document tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for missing or unknown versions.
    pub fn detect_root(root: &Value) -> Result<SpecVersion> {
        let declared = match root.get("asyncapi") {
            Some(Value::String(version)) => version.clone(),
            Some(Value::Number(version)) => version.to_string(),
            _ => {
                return Err(Error::UnsupportedVersion(
                    "missing `asyncapi` field".to_string(),
                ))
            }
        };

        match declared.trim().split('.').next() {
            Some("2") => Ok(SpecVersion::V2),
            Some("3") => Ok(SpecVersion::V3),
            _ => Err(Error::UnsupportedVersion(declared)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_versions() {
        assert_eq!(
            VersionDetector::detect_root(&json!({ "asyncapi": "2.0.0" })).unwrap(),
            SpecVersion::V2
        );
        assert_eq!(
            VersionDetector::detect_root(&json!({ "asyncapi": "2.6.0" })).unwrap(),
            SpecVersion::V2
        );
        assert_eq!(
            VersionDetector::detect_root(&json!({ "asyncapi": "3.0.0" })).unwrap(),
            SpecVersion::V3
        );
    }

    #[test]
    fn test_detect_unsupported() {
        let err = VersionDetector::detect_root(&json!({ "asyncapi": "1.2.0" })).unwrap_err();
        assert_eq!(err.to_string(), "unsupported AsyncAPI version: 1.2.0");

        assert!(VersionDetector::detect_root(&json!({ "openapi": "3.1.0" })).is_err());
    }
}
