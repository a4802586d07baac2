use super::{end_block, DocumentRenderer};
use crate::error::Result;
use crate::extractor::OperationInfo;
use crate::markdown::{header, indent, link, list_item, slugify};

/// Anchor of a server section.
pub(crate) fn server_anchor(name: &str) -> String {
    format!("#{}-server", slugify(name))
}

/// Anchor of an operation section.
pub(crate) fn operation_anchor(operation: &OperationInfo) -> String {
    format!(
        "#{}-operation",
        slugify(&format!("{} {}", operation.kind.label(), operation.channel_name))
    )
}

impl DocumentRenderer<'_> {
    pub(super) fn render_toc(&self, operations: &[OperationInfo]) -> Result<String> {
        let servers = self.document.servers()?;
        if servers.is_empty() && operations.is_empty() {
            return Ok(String::new());
        }

        let mut list = String::new();
        if !servers.is_empty() {
            list.push_str(&list_item(&link("Servers", "#servers")));
            for (name, _) in &servers {
                list.push_str(&indent(&list_item(&link(name, &server_anchor(name))), 2));
            }
        }
        if !operations.is_empty() {
            list.push_str(&list_item(&link("Operations", "#operations")));
            for operation in operations {
                let text = format!("{} {}", operation.kind.label(), operation.channel_name);
                list.push_str(&indent(&list_item(&link(&text, &operation_anchor(operation))), 2));
            }
        }

        let mut out = header(2, "Table of Contents");
        out.push_str(&list);
        end_block(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::AsyncApiDocument;
    use crate::extractor::extractor_for;
    use crate::renderer::{DocumentRenderer, RenderConfig};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render_toc(document: Value) -> String {
        let document = AsyncApiDocument::new(document).unwrap();
        let operations = extractor_for(document.version()).extract_operations(&document);
        let config = RenderConfig::default();
        DocumentRenderer::new(&document, &config)
            .render_toc(&operations)
            .unwrap()
    }

    #[test]
    fn test_render_toc() {
        let markdown = render_toc(json!({
            "asyncapi": "2.6.0",
            "servers": {
                "production": {},
                "testing": {},
                "canary": {}
            },
            "channels": {
                "testChannel": { "publish": {}, "subscribe": {} },
                "smartylighting/streetlights/1/0": { "subscribe": {} },
                "smartylighting/streetlights": { "publish": {} }
            }
        }));

        let expected = "\
## Table of Contents

* [Servers](#servers)
  * [production](#production-server)
  * [testing](#testing-server)
  * [canary](#canary-server)
* [Operations](#operations)
  * [PUB testChannel](#pub-testchannel-operation)
  * [SUB testChannel](#sub-testchannel-operation)
  * [SUB smartylighting/streetlights/1/0](#sub-smartylightingstreetlights10-operation)
  * [PUB smartylighting/streetlights](#pub-smartylightingstreetlights-operation)

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_toc_of_v3_operations() {
        let markdown = render_toc(json!({
            "asyncapi": "3.0.0",
            "channels": {
                "userSignedUp": { "address": "user/signedup", "messages": {} }
            },
            "operations": {
                "onUserSignUp": {
                    "action": "receive",
                    "channel": { "$ref": "#/channels/userSignedUp" }
                }
            }
        }));

        assert_eq!(
            markdown,
            "## Table of Contents\n\n* [Operations](#operations)\n  * [RECEIVE user/signedup](#receive-usersignedup-operation)\n\n"
        );
    }

    #[test]
    fn test_empty_toc() {
        assert_eq!(render_toc(json!({ "asyncapi": "2.6.0" })), "");
    }
}
