use super::{message_refs, OperationExtractor, OperationInfo, OperationKind};
use crate::document::{display_value, AsyncApiDocument, Channel};
use log::{debug, warn};
use serde_json::Value;

/// Extractor for AsyncAPI 2.x documents.
///
/// Walks the channels in document order and emits the `publish` operation of a
/// channel before its `subscribe` operation.
pub struct V2Extractor;

impl OperationExtractor for V2Extractor {
    fn extract_operations(&self, document: &AsyncApiDocument) -> Vec<OperationInfo> {
        let channels = match document.channels() {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Failed to read channels: {}", e);
                return Vec::new();
            }
        };

        let mut operations = Vec::new();
        for (channel_name, channel) in channels {
            let candidates = [
                (OperationKind::Publish, channel.publish.as_ref()),
                (OperationKind::Subscribe, channel.subscribe.as_ref()),
            ];
            for (kind, value) in candidates {
                let Some(value) = value else { continue };
                match extract_operation(document, kind, &channel_name, &channel, value) {
                    Some(info) => operations.push(info),
                    None => warn!("Skipping {} operation of {}", kind.label(), channel_name),
                }
            }
        }

        debug!("Extracted {} operations", operations.len());
        operations
    }
}

fn extract_operation(
    document: &AsyncApiDocument,
    kind: OperationKind,
    channel_name: &str,
    channel: &Channel,
    value: &Value,
) -> Option<OperationInfo> {
    let operation = document
        .operation(value)
        .inspect_err(|e| warn!("Invalid operation: {}", e))
        .ok()?;

    let messages = match &operation.message {
        Some(message) => {
            let resolved = document
                .resolve(message)
                .inspect_err(|e| warn!("Invalid message: {}", e))
                .ok()?;
            match resolved.get("oneOf") {
                Some(Value::Array(members)) => {
                    message_refs(document, members.iter().map(|member| (None, member)))
                }
                _ => message_refs(document, [(None, message)]),
            }
        }
        None => Vec::new(),
    };

    debug!(
        "Extracted {} {} with {} message(s)",
        kind.label(),
        channel_name,
        messages.len()
    );

    Some(OperationInfo {
        kind,
        channel_name: channel_name.to_string(),
        channel: channel.clone(),
        servers: channel.servers.iter().map(display_value).collect(),
        operation,
        messages,
        reply: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document() -> AsyncApiDocument {
        AsyncApiDocument::new(json!({
            "asyncapi": "2.6.0",
            "channels": {
                "smartylighting/streetlights/1/0/event/{streetlightId}/lighting/measured": {
                    "servers": ["production"],
                    "subscribe": {
                        "operationId": "receiveLightMeasurement",
                        "message": { "$ref": "#/components/messages/lightMeasured" }
                    }
                },
                "user/signedup": {
                    "publish": {
                        "message": {
                            "oneOf": [
                                { "name": "first", "payload": { "type": "string" } },
                                { "payload": { "type": "number" } }
                            ]
                        }
                    },
                    "subscribe": {}
                }
            },
            "components": {
                "messages": {
                    "lightMeasured": { "payload": { "type": "object" } }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_operations_in_order() {
        let operations = V2Extractor.extract_operations(&document());

        let summary: Vec<(&str, &str, usize)> = operations
            .iter()
            .map(|op| (op.kind.label(), op.channel_name.as_str(), op.messages.len()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (
                    "SUB",
                    "smartylighting/streetlights/1/0/event/{streetlightId}/lighting/measured",
                    1
                ),
                ("PUB", "user/signedup", 2),
                ("SUB", "user/signedup", 0),
            ]
        );
    }

    #[test]
    fn test_extract_operation_details() {
        let operations = V2Extractor.extract_operations(&document());
        let first = &operations[0];

        assert_eq!(
            first.operation.operation_id.as_deref(),
            Some("receiveLightMeasurement")
        );
        assert_eq!(first.servers, vec!["production"]);
        assert_eq!(first.messages[0].id.as_deref(), Some("lightMeasured"));

        let ids: Vec<Option<&str>> = operations[1]
            .messages
            .iter()
            .map(|message| message.id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("first"), None]);
    }

    #[test]
    fn test_document_without_channels() {
        let document = AsyncApiDocument::new(json!({ "asyncapi": "2.0.0" })).unwrap();
        assert!(V2Extractor.extract_operations(&document).is_empty());
    }
}
