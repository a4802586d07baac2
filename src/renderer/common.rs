//! Sections shared by servers, channels, operations and messages.

use super::info::external_docs_link;
use super::{end_block, DocumentRenderer};
use crate::document::{Extensions, Tag};
use crate::markdown::{header, indent, inline_code, list_item};
use crate::schema::custom_extensions;
use log::warn;
use serde_json::Value;

impl DocumentRenderer<'_> {
    /// One titled table per binding protocol.
    pub(super) fn render_bindings(&mut self, name: &str, bindings: Option<&Value>) -> String {
        let Some(bindings) = bindings else {
            return String::new();
        };
        let bindings = match self.document.resolve(bindings) {
            Ok(Value::Object(bindings)) => bindings,
            Ok(_) => return String::new(),
            Err(e) => {
                warn!("Skipping bindings: {}", e);
                return String::new();
            }
        };

        let mut out = String::new();
        for (protocol, binding) in bindings {
            let binding = match self.document.resolve(binding) {
                Ok(binding) => binding,
                Err(e) => {
                    warn!("Skipping {} binding: {}", protocol, e);
                    continue;
                }
            };
            let title = format!("{} {}", inline_code(protocol), name);
            out.push_str(&self.json_table(&title, binding));
        }
        out
    }

    /// Custom extensions as a titled table; nothing when there are none.
    pub(super) fn render_extensions(&mut self, name: &str, extensions: &Extensions) -> String {
        let extensions = custom_extensions(extensions);
        if extensions.is_empty() {
            return String::new();
        }
        let value = Value::Object(extensions.into_iter().collect());
        self.json_table(name, &value)
    }

    /// Titled list of tags; `tags` may hold references.
    pub(super) fn render_tags(&self, name: &str, tags: &[Value]) -> String {
        let tags = self.document.tag_list(tags);
        if tags.is_empty() {
            return String::new();
        }
        let mut out = header(6, name);
        out.push_str(&self.render_tag_list(&tags));
        out
    }

    pub(super) fn render_tag_list(&self, tags: &[Tag]) -> String {
        let mut out = String::new();
        for tag in tags {
            out.push_str(&list_item(&tag.name));
            out.push('\n');

            let mut details = String::new();
            if let Some(description) = tag.description.as_deref().filter(|d| !d.is_empty()) {
                details.push_str(description.trim_end());
                details.push('\n');
            }
            if let Some(docs) = self.document.external_docs_of(tag.external_docs.as_ref()) {
                details.push_str(&external_docs_link(&docs));
                details.push('\n');
            }
            out.push_str(&indent(&details, 2));
        }
        end_block(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::document::AsyncApiDocument;
    use crate::renderer::{DocumentRenderer, RenderConfig};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document() -> AsyncApiDocument {
        AsyncApiDocument::new(json!({
            "asyncapi": "2.6.0",
            "components": {
                "tags": { "shared": { "name": "shared", "description": "Shared tag" } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_render_bindings() {
        let document = document();
        let config = RenderConfig::default();
        let mut renderer = DocumentRenderer::new(&document, &config);

        let bindings = json!({
            "http": {
                "type": "request",
                "method": "GET",
                "query": {
                    "type": "object",
                    "required": ["companyId"],
                    "properties": {
                        "companyId": { "type": "number", "minimum": 1, "description": "The Id of the company." }
                    },
                    "additionalProperties": false
                },
                "bindingVersion": "0.1.0"
            }
        });

        let expected = "\
#### `http` Binding specific information

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| type | - | - | `\"request\"` | - | - |
| method | - | - | `\"GET\"` | - | - |
| query | object | - | - | - | **additional properties are NOT allowed** |
| query.companyId | number | The Id of the company. | - | >= 1 | **required** |
| bindingVersion | - | - | `\"0.1.0\"` | - | - |

";
        assert_eq!(
            renderer.render_bindings("Binding specific information", Some(&bindings)),
            expected
        );
        assert_eq!(renderer.render_bindings("Binding specific information", None), "");
    }

    #[test]
    fn test_render_extensions() {
        let document = document();
        let config = RenderConfig::default();
        let mut renderer = DocumentRenderer::new(&document, &config);

        let mut extensions = IndexMap::new();
        extensions.insert("x-schema-extensions-as-primitive".to_string(), json!("dummy"));
        extensions.insert("x-parser-message-name".to_string(), json!("hidden"));

        let expected = "\
#### Extensions

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| x-schema-extensions-as-primitive | - | - | `\"dummy\"` | - | - |

";
        assert_eq!(renderer.render_extensions("Extensions", &extensions), expected);
        assert_eq!(renderer.render_extensions("Extensions", &IndexMap::new()), "");
    }

    #[test]
    fn test_render_tags() {
        let document = document();
        let config = RenderConfig::default();
        let renderer = DocumentRenderer::new(&document, &config);

        let tags = [
            json!({ "name": "user" }),
            json!({ "$ref": "#/components/tags/shared" }),
        ];

        assert_eq!(
            renderer.render_tags("Operation tags", &tags),
            "###### Operation tags\n\n* user\n\n* shared\n\n  Shared tag\n\n"
        );
        assert_eq!(renderer.render_tags("Operation tags", &[]), "");
    }
}
