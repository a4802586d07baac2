use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum number of `$ref` hops followed before giving up on a chain.
pub const MAX_REFERENCE_DEPTH: usize = 32;

/// Returns the `$ref` string of a reference object, if the value is one.
pub fn reference_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Resolves a local reference (`#/components/schemas/User`, or `#` for the
/// document root) against a document.
///
/// Returns `None` for external references and pointers that do not match.
pub fn resolve_pointer<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(root);
    }
    root.pointer(pointer)
}

/// Follows `$ref` chains until a non-reference value is reached.
///
/// # Errors
///
/// Returns an error when a reference cannot be resolved inside the document or the
/// chain is longer than [`MAX_REFERENCE_DEPTH`].
pub fn dereference<'a>(root: &'a Value, value: &'a Value) -> Result<&'a Value> {
    let mut current = value;
    for _ in 0..MAX_REFERENCE_DEPTH {
        match reference_of(current) {
            Some(reference) => {
                current = resolve_pointer(root, reference)
                    .ok_or_else(|| Error::Reference(reference.to_string()))?;
            }
            None => return Ok(current),
        }
    }
    Err(Error::Reference(format!(
        "reference chain deeper than {} starting at {}",
        MAX_REFERENCE_DEPTH,
        reference_of(value).unwrap_or_default()
    )))
}

/// Last segment of a JSON pointer reference, with `~1`/`~0` escapes decoded.
///
/// `#/components/messages/UserSignedUp` yields `UserSignedUp`.
pub fn reference_name(reference: &str) -> Option<String> {
    let pointer = reference.strip_prefix('#')?;
    let segment = pointer.rsplit('/').next().filter(|s| !s.is_empty())?;
    Some(segment.replace("~1", "/").replace("~0", "~"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_pointer() {
        let doc = json!({ "components": { "schemas": { "User": { "type": "object" } } } });

        assert_eq!(
            resolve_pointer(&doc, "#/components/schemas/User"),
            Some(&json!({ "type": "object" }))
        );
        assert_eq!(resolve_pointer(&doc, "#"), Some(&doc));
        assert_eq!(resolve_pointer(&doc, "#/components/schemas/Missing"), None);
        assert_eq!(resolve_pointer(&doc, "other.yaml#/User"), None);
    }

    #[test]
    fn test_dereference_follows_chains() {
        let doc = json!({
            "a": { "$ref": "#/b" },
            "b": { "$ref": "#/c" },
            "c": { "value": 1 }
        });

        let start = json!({ "$ref": "#/a" });
        assert_eq!(dereference(&doc, &start).unwrap(), &json!({ "value": 1 }));
    }

    #[test]
    fn test_dereference_rejects_loops_and_dangling_refs() {
        let doc = json!({
            "a": { "$ref": "#/b" },
            "b": { "$ref": "#/a" }
        });

        assert!(dereference(&doc, &json!({ "$ref": "#/a" })).is_err());
        assert!(dereference(&doc, &json!({ "$ref": "#/nope" })).is_err());
    }

    #[test]
    fn test_reference_name() {
        assert_eq!(
            reference_name("#/components/messages/UserSignedUp"),
            Some("UserSignedUp".to_string())
        );
        assert_eq!(
            reference_name("#/channels/user~1signedup"),
            Some("user/signedup".to_string())
        );
        assert_eq!(reference_name("#"), None);
    }
}
