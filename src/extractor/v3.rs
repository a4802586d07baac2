use super::{message_refs, MessageRef, OperationExtractor, OperationInfo, OperationKind, ReplyInfo};
use crate::document::{AsyncApiDocument, Channel, Operation, OperationReply};
use crate::error::{Error, Result};
use crate::refs::{reference_name, reference_of};
use crate::schema::custom_extensions;
use log::{debug, warn};
use serde_json::Value;

/// Extractor for AsyncAPI 3.x documents.
///
/// Operations are grouped by the channel they point at, channels in document
/// order, so the output reads channel by channel like a 2.x document.
pub struct V3Extractor;

impl OperationExtractor for V3Extractor {
    fn extract_operations(&self, document: &AsyncApiDocument) -> Vec<OperationInfo> {
        let root = document.root();
        let (Some(Value::Object(channels)), Some(Value::Object(operations))) =
            (root.get("channels"), root.get("operations"))
        else {
            return Vec::new();
        };

        // Each operation paired with the channel value it resolves to.
        let mut targets: Vec<(&String, &Value, &Value)> = Vec::new();
        for (operation_id, value) in operations {
            match channel_target(document, value) {
                Ok(channel) => targets.push((operation_id, value, channel)),
                Err(e) => warn!("Skipping operation {}: {}", operation_id, e),
            }
        }

        let mut extracted = Vec::new();
        for (channel_key, channel_value) in channels {
            let Ok(resolved_channel) = document.resolve(channel_value) else {
                warn!("Skipping channel {}: unresolvable reference", channel_key);
                continue;
            };
            for (operation_id, value, _) in targets
                .iter()
                .filter(|(_, _, target)| std::ptr::eq(*target, resolved_channel))
            {
                match extract_operation(document, channel_key, resolved_channel, value) {
                    Ok(info) => extracted.push(info),
                    Err(e) => warn!("Skipping operation {}: {}", operation_id, e),
                }
            }
        }

        debug!("Extracted {} operations", extracted.len());
        extracted
    }
}

/// The channel object an operation points at.
fn channel_target<'a>(document: &'a AsyncApiDocument, operation: &'a Value) -> Result<&'a Value> {
    let operation = document.resolve(operation)?;
    let channel = operation
        .get("channel")
        .ok_or_else(|| Error::Reference("operation without channel".to_string()))?;
    document.resolve(channel)
}

fn extract_operation(
    document: &AsyncApiDocument,
    channel_key: &str,
    channel_value: &Value,
    value: &Value,
) -> Result<OperationInfo> {
    let operation: Operation = document.operation(value)?;
    let channel: Channel = document.view(channel_value)?;
    let channel_name = channel
        .address
        .clone()
        .unwrap_or_else(|| channel_key.to_string());

    let is_send = operation.action.as_deref() == Some("send");
    let kind = match (is_send, operation.reply.is_some()) {
        (true, true) => OperationKind::Request,
        (true, false) => OperationKind::Send,
        (false, true) => OperationKind::Reply,
        (false, false) => OperationKind::Receive,
    };

    let messages = if operation.messages.is_empty() {
        channel_messages(document, &channel)
    } else {
        message_refs(document, operation.messages.iter().map(|message| (None, message)))
    };

    let reply = match &operation.reply {
        Some(reply) => Some(extract_reply(document, reply)?),
        None => None,
    };

    debug!(
        "Extracted {} {} with {} message(s)",
        kind.label(),
        channel_name,
        messages.len()
    );

    Ok(OperationInfo {
        kind,
        channel_name,
        servers: restricted_servers(document, &channel),
        channel,
        operation,
        messages,
        reply,
    })
}

fn channel_messages(document: &AsyncApiDocument, channel: &Channel) -> Vec<MessageRef> {
    message_refs(
        document,
        channel
            .messages
            .iter()
            .map(|(key, message)| (Some(key.as_str()), message)),
    )
}

/// Names of the servers a channel is limited to, or nothing when the channel is
/// available on every server.
fn restricted_servers(document: &AsyncApiDocument, channel: &Channel) -> Vec<String> {
    if channel.servers.len() == document.server_count() {
        return Vec::new();
    }
    channel
        .servers
        .iter()
        .filter_map(|server| reference_of(server).and_then(reference_name))
        .collect()
}

fn extract_reply(document: &AsyncApiDocument, value: &Value) -> Result<ReplyInfo> {
    let reply: OperationReply = document.view(value)?;

    let channel_address = match &reply.channel {
        Some(channel) => {
            let view: Channel = document.view(channel)?;
            view.address
                .or_else(|| reference_of(channel).and_then(reference_name))
        }
        None => None,
    };

    let address = match &reply.address {
        Some(address) => Some(document.view(address)?),
        None => None,
    };

    Ok(ReplyInfo {
        channel_address,
        address,
        messages: message_refs(document, reply.messages.iter().map(|message| (None, message))),
        extensions: custom_extensions(&reply.extensions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document() -> AsyncApiDocument {
        AsyncApiDocument::new(json!({
            "asyncapi": "3.0.0",
            "servers": {
                "production": { "host": "broker.example.com", "protocol": "mqtt" },
                "staging": { "host": "staging.example.com", "protocol": "mqtt" }
            },
            "channels": {
                "lightingMeasured": {
                    "address": "smartylighting/streetlights/1/0/event/{streetlightId}/lighting/measured",
                    "servers": [{ "$ref": "#/servers/production" }],
                    "messages": {
                        "lightMeasured": { "$ref": "#/components/messages/lightMeasured" }
                    }
                },
                "ping": {
                    "address": "/ping",
                    "messages": { "ping": { "payload": { "type": "string" } } }
                },
                "pong": {
                    "address": "/pong",
                    "messages": { "pong": { "name": "pongMessage" } }
                }
            },
            "operations": {
                "pingRequest": {
                    "action": "send",
                    "channel": { "$ref": "#/channels/ping" },
                    "reply": {
                        "channel": { "$ref": "#/channels/pong" },
                        "address": { "location": "$message.header#/replyTo" },
                        "messages": [{ "$ref": "#/channels/pong/messages/pong" }],
                        "x-reply-kind": "direct"
                    }
                },
                "receiveLightMeasurement": {
                    "action": "receive",
                    "channel": { "$ref": "#/channels/lightingMeasured" },
                    "messages": [{ "$ref": "#/channels/lightingMeasured/messages/lightMeasured" }]
                },
                "orphan": { "action": "send" }
            },
            "components": {
                "messages": { "lightMeasured": { "payload": { "type": "object" } } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_operations_follow_channel_order() {
        let operations = V3Extractor.extract_operations(&document());

        let summary: Vec<(&str, &str)> = operations
            .iter()
            .map(|op| (op.kind.label(), op.channel_name.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (
                    "RECEIVE",
                    "smartylighting/streetlights/1/0/event/{streetlightId}/lighting/measured"
                ),
                ("REQUEST", "/ping"),
            ]
        );
    }

    #[test]
    fn test_messages_and_servers() {
        let operations = V3Extractor.extract_operations(&document());

        let receive = &operations[0];
        assert_eq!(receive.servers, vec!["production"]);
        assert_eq!(receive.messages[0].id.as_deref(), Some("lightMeasured"));

        let request = &operations[1];
        assert!(request.servers.is_empty());
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].id.as_deref(), Some("ping"));
    }

    #[test]
    fn test_reply_information() {
        let operations = V3Extractor.extract_operations(&document());
        let reply = operations[1].reply.as_ref().unwrap();

        assert_eq!(reply.channel_address.as_deref(), Some("/pong"));
        assert_eq!(
            reply.address.as_ref().map(|address| address.location.as_str()),
            Some("$message.header#/replyTo")
        );
        assert_eq!(reply.messages[0].id.as_deref(), Some("pongMessage"));
        assert_eq!(reply.extensions.get("x-reply-kind"), Some(&json!("direct")));
    }
}
