use super::info::external_docs_link;
use super::toc::server_anchor;
use super::{end_block, DocumentRenderer};
use crate::detector::SpecVersion;
use crate::document::{Channel, Parameter};
use crate::extractor::{MessageRef, OperationInfo, OperationKind, ReplyInfo};
use crate::markdown::{header, inline_code, link, list_item, paragraph};
use crate::schema::synthetic::ParameterSchema;
use crate::schema::SchemaTableOptions;
use log::debug;

/// Sentence introducing several reply messages.
fn reply_messages_preamble(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Request => {
            "Receive **one of** the following messages as a response to the request:"
        }
        OperationKind::Reply => "Replying with **one of** the following messages:",
        _ => "Accepts **one of** the following messages:",
    }
}

impl DocumentRenderer<'_> {
    pub(super) fn render_operations(&mut self, operations: &[OperationInfo]) -> String {
        if operations.is_empty() {
            return String::new();
        }
        debug!("Rendering {} operations", operations.len());

        let mut out = header(2, "Operations");
        for operation in operations {
            out.push_str(&self.render_operation(operation));
        }
        out
    }

    fn render_operation(&mut self, info: &OperationInfo) -> String {
        let operation = &info.operation;
        let mut out = header(
            3,
            &format!(
                "{} {} Operation",
                info.kind.label(),
                inline_code(&info.channel_name)
            ),
        );

        if let Some(summary) = operation.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                out.push_str(&paragraph(&format!("*{}*", summary)));
            }
        }

        if let Some(id) = operation.operation_id.as_deref().filter(|id| !id.is_empty()) {
            out.push_str(&list_item(&format!("Operation ID: {}", inline_code(id))));
        }
        if !info.servers.is_empty() {
            let servers: Vec<String> = info
                .servers
                .iter()
                .map(|name| link(name, &server_anchor(name)))
                .collect();
            out.push_str(&list_item(&format!(
                "Available only on servers: {}",
                servers.join(", ")
            )));
        }
        end_block(&mut out);

        if let Some(description) = &info.channel.description {
            out.push_str(&paragraph(description));
        }
        if let Some(description) = &operation.description {
            out.push_str(&paragraph(description));
        }
        if let Some(docs) = self.document.external_docs_of(operation.external_docs.as_ref()) {
            out.push_str(&paragraph(&external_docs_link(&docs)));
        }

        out.push_str(&self.render_tags("Operation tags", &operation.tags));
        out.push_str(&self.render_parameters(&info.channel));
        out.push_str(&self.render_security(
            "Additional security requirements",
            None,
            &operation.security,
        ));

        out.push_str(&self.render_bindings("Channel specific information", info.channel.bindings.as_ref()));
        out.push_str(&self.render_bindings("Operation specific information", operation.bindings.as_ref()));

        let (channel_extensions, operation_extensions) = match self.document.version() {
            SpecVersion::V2 => ("Channel Extensions", "Operation Extensions"),
            SpecVersion::V3 => ("Channel extensions", "Operation extensions"),
        };
        out.push_str(&self.render_extensions(channel_extensions, &info.channel.extensions));
        out.push_str(&self.render_extensions(operation_extensions, &operation.extensions));

        out.push_str(&self.render_message_list(&info.messages, info.kind.messages_preamble()));

        if let Some(reply) = &info.reply {
            out.push_str(&self.render_reply(info.kind, reply));
        }
        out
    }

    /// Channel parameters as one untitled table.
    fn render_parameters(&mut self, channel: &Channel) -> String {
        let version = self.document.version();
        let parameters: Vec<ParameterSchema> = channel
            .parameters
            .iter()
            .filter_map(|(name, value)| {
                let parameter: Parameter = self.document.view_or_warn(value, "parameter")?;
                Some(ParameterSchema {
                    name: name.clone(),
                    schema: parameter.schema_value(version),
                    description: parameter.description,
                    location: parameter.location,
                })
            })
            .collect();

        let Some(id) = self.builder().parameters_to_schema(&parameters) else {
            return String::new();
        };
        let mut out = header(4, "Parameters");
        out.push_str(&self.table_for(id, &SchemaTableOptions::untitled()));
        out
    }

    fn render_message_list(&mut self, messages: &[MessageRef], preamble: &str) -> String {
        let mut out = String::new();
        if messages.len() > 1 {
            out.push_str(&paragraph(preamble));
        }
        for message in messages {
            out.push_str(&self.render_message(message));
        }
        out
    }

    fn render_reply(&mut self, kind: OperationKind, reply: &ReplyInfo) -> String {
        let title = match kind {
            OperationKind::Request | OperationKind::Send => "Request information",
            _ => "Response information",
        };
        let mut out = header(4, title);

        if let Some(address) = &reply.channel_address {
            out.push_str(&list_item(&format!(
                "{} should be done to channel: {}",
                kind.label().to_lowercase(),
                inline_code(address)
            )));
            end_block(&mut out);
        }

        if let Some(address) = &reply.address {
            out.push_str(&header(4, "Operation reply address information"));
            if let Some(description) = &address.description {
                out.push_str(&paragraph(description));
            }
            out.push_str(&list_item(&format!(
                "Operation reply address location: {}",
                inline_code(&address.location)
            )));
            end_block(&mut out);
            out.push_str(&self.render_extensions(
                "Operation reply address extensions",
                &address.extensions,
            ));
        }

        out.push_str(&self.render_message_list(&reply.messages, reply_messages_preamble(kind)));
        out.push_str(&self.render_extensions("Operation reply extensions", &reply.extensions));
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::document::AsyncApiDocument;
    use crate::extractor::extractor_for;
    use crate::renderer::{DocumentRenderer, RenderConfig};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render_operations(document: Value) -> String {
        let document = AsyncApiDocument::new(document).unwrap();
        let operations = extractor_for(document.version()).extract_operations(&document);
        let config = RenderConfig::default();
        DocumentRenderer::new(&document, &config).render_operations(&operations)
    }

    #[test]
    fn test_render_operation() {
        let markdown = render_operations(json!({
            "asyncapi": "2.6.0",
            "channels": {
                "user/signedup": {
                    "description": "This channel is used to exchange messages about users signing up",
                    "servers": ["rabbitmqBrokerInProd", "rabbitmqBrokerInStaging"],
                    "subscribe": {
                        "operationId": "signedupuser",
                        "externalDocs": { "description": "More info here", "url": "https://example.com" },
                        "tags": [{ "name": "user" }, { "name": "signup" }, { "name": "register" }],
                        "summary": "A user signed up.",
                        "message": {
                            "description": "A longer description of the message",
                            "payload": {
                                "type": "object",
                                "properties": {
                                    "user": { "type": "string" },
                                    "signup": { "type": "number" }
                                }
                            }
                        }
                    }
                }
            }
        }));

        let expected = "\
## Operations

### SUB `user/signedup` Operation

*A user signed up.*

* Operation ID: `signedupuser`
* Available only on servers: [rabbitmqBrokerInProd](#rabbitmqbrokerinprod-server), [rabbitmqBrokerInStaging](#rabbitmqbrokerinstaging-server)

This channel is used to exchange messages about users signing up

[More info here](https://example.com)

###### Operation tags

* user

* signup

* register

#### Message `<anonymous-message-1>`

A longer description of the message

##### Payload

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| (root) | object | - | - | - | **additional properties are allowed** |
| user | string | - | - | - | - |
| signup | number | - | - | - | - |

> Examples of payload _(generated)_

```json
{
  \"user\": \"string\",
  \"signup\": 0
}
```

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_parameters() {
        let markdown = render_operations(json!({
            "asyncapi": "2.6.0",
            "channels": {
                "user/{userId}/signup/{foobar}": {
                    "parameters": {
                        "userId": {
                            "description": "Id of the user.",
                            "schema": { "type": "string" },
                            "location": "$message.payload#/user/id"
                        },
                        "foobar": { "schema": { "type": "string" } }
                    },
                    "publish": {}
                }
            }
        }));

        let expected = "\
## Operations

### PUB `user/{userId}/signup/{foobar}` Operation

#### Parameters

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| userId | string | Id of the user. | - | - | **required**, **parameter location ($message.payload#/user/id)** |
| foobar | string | - | - | - | **required** |

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_multiple_messages() {
        let markdown = render_operations(json!({
            "asyncapi": "2.6.0",
            "channels": {
                "user/signedup": {
                    "publish": {
                        "message": {
                            "oneOf": [
                                { "payload": { "type": "object", "properties": { "signup": { "type": "number" } } } },
                                { "payload": { "type": "object", "properties": { "user": { "type": "string" } } } }
                            ]
                        }
                    }
                }
            }
        }));

        assert!(markdown.contains(
            "### PUB `user/signedup` Operation\n\nAccepts **one of** the following messages:\n\n#### Message `<anonymous-message-1>`\n\n"
        ));
        assert!(markdown.contains("#### Message `<anonymous-message-2>`\n\n"));
        assert!(markdown.contains("```json\n{\n  \"signup\": 0\n}\n```\n"));
        assert!(markdown.contains("```json\n{\n  \"user\": \"string\"\n}\n```\n"));
    }

    #[test]
    fn test_render_request_reply() {
        let markdown = render_operations(json!({
            "asyncapi": "3.0.0",
            "servers": {
                "production": { "host": "broker.example.com", "protocol": "mqtt" },
                "staging": { "host": "staging.example.com", "protocol": "mqtt" }
            },
            "channels": {
                "ping": {
                    "address": "/ping",
                    "servers": [{ "$ref": "#/servers/production" }],
                    "messages": { "ping": { "name": "ping", "payload": { "type": "string", "const": "ping" } } }
                },
                "pong": {
                    "address": "/pong",
                    "messages": {
                        "pong": { "name": "pong", "payload": { "type": "string", "const": "pong" } },
                        "error": { "name": "error", "payload": { "type": "string" } }
                    }
                }
            },
            "operations": {
                "pingRequest": {
                    "action": "send",
                    "channel": { "$ref": "#/channels/ping" },
                    "security": [{ "type": "httpApiKey", "name": "api_key", "in": "header" }],
                    "reply": {
                        "channel": { "$ref": "#/channels/pong" },
                        "address": {
                            "description": "Reply address set by the requester",
                            "location": "$message.header#/replyTo"
                        },
                        "messages": [
                            { "$ref": "#/channels/pong/messages/pong" },
                            { "$ref": "#/channels/pong/messages/error" }
                        ],
                        "x-reply-kind": "direct"
                    }
                }
            }
        }));

        let expected = "\
## Operations

### REQUEST `/ping` Operation

* Available only on servers: [production](#production-server)

#### Additional security requirements

##### Security Requirement 1

* Type: `HTTP API key`
  * Name: api_key
  * In: header

#### Message `ping`

##### Payload

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| (root) | string | - | const (`\"ping\"`) | - | - |

> Examples of payload _(generated)_

```json
\"ping\"
```

#### Request information

* request should be done to channel: `/pong`

#### Operation reply address information

Reply address set by the requester

* Operation reply address location: `$message.header#/replyTo`

Receive **one of** the following messages as a response to the request:

#### Message `pong`

##### Payload

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| (root) | string | - | const (`\"pong\"`) | - | - |

> Examples of payload _(generated)_

```json
\"pong\"
```

#### Message `error`

##### Payload

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| (root) | string | - | - | - | - |

> Examples of payload _(generated)_

```json
\"string\"
```

#### Operation reply extensions

| Name | Type | Description | Value | Constraints | Notes |
|---|---|---|---|---|---|
| x-reply-kind | - | - | `\"direct\"` | - | - |

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_v3_parameters_are_strings() {
        let markdown = render_operations(json!({
            "asyncapi": "3.0.0",
            "channels": {
                "lighting": {
                    "address": "lights/{streetlightId}",
                    "parameters": {
                        "streetlightId": { "description": "The ID of the streetlight.", "enum": ["a", "b"] }
                    }
                }
            },
            "operations": {
                "turnOn": { "action": "receive", "channel": { "$ref": "#/channels/lighting" } }
            }
        }));

        assert!(markdown.contains("### RECEIVE `lights/{streetlightId}` Operation\n\n#### Parameters\n\n"));
        assert!(markdown.contains(
            "| streetlightId | string | The ID of the streetlight. | allowed (`\"a\"`, `\"b\"`) | - | **required** |\n"
        ));
    }

    #[test]
    fn test_no_operations() {
        assert_eq!(render_operations(json!({ "asyncapi": "2.6.0" })), "");
    }
}
