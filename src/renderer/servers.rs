use super::{end_block, DocumentRenderer};
use crate::document::{display_value, Server, ServerVariable};
use crate::error::Result;
use crate::markdown::{header, inline_code, list_item, paragraph, table};
use log::debug;
use serde_json::Value;

const VARIABLE_HEADERS: [&str; 4] = ["Name", "Description", "Default value", "Allowed values"];

impl DocumentRenderer<'_> {
    pub(super) fn render_servers(&mut self) -> Result<String> {
        let servers = self.document.servers()?;
        if servers.is_empty() {
            return Ok(String::new());
        }
        debug!("Rendering {} servers", servers.len());

        let mut out = header(2, "Servers");
        for (name, server) in &servers {
            out.push_str(&self.render_server(name, server));
        }
        Ok(out)
    }

    fn render_server(&mut self, name: &str, server: &Server) -> String {
        let mut out = header(3, &format!("{} Server", inline_code(name)));

        out.push_str(&list_item(&format!("URL: {}", inline_code(&server.address()))));
        let protocol = match &server.protocol_version {
            Some(version) => format!("{} {}", server.protocol, version),
            None => server.protocol.clone(),
        };
        out.push_str(&list_item(&format!("Protocol: {}", inline_code(&protocol))));
        end_block(&mut out);

        if let Some(description) = &server.description {
            out.push_str(&paragraph(description));
        }

        out.push_str(&self.render_server_variables(&server.variables));
        out.push_str(&self.render_security(
            "Security",
            Some(server.protocol.as_str()),
            &server.security,
        ));
        out.push_str(&self.render_bindings("Server specific information", server.bindings.as_ref()));
        out.push_str(&self.render_extensions("Server Extensions", &server.extensions));
        out
    }

    fn render_server_variables(&self, variables: &indexmap::IndexMap<String, Value>) -> String {
        let rows: Vec<Vec<String>> = variables
            .iter()
            .filter_map(|(name, variable)| {
                let variable: ServerVariable =
                    self.document.view_or_warn(variable, "server variable")?;
                Some(variable_row(name, &variable))
            })
            .collect();
        if rows.is_empty() {
            return String::new();
        }

        let mut out = header(4, "URL Variables");
        out.push_str(&table(&VARIABLE_HEADERS, &rows));
        out.push('\n');
        out
    }
}

fn variable_row(name: &str, variable: &ServerVariable) -> Vec<String> {
    let description = variable
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .unwrap_or("-");
    let default = variable
        .default
        .as_ref()
        .map(|value| inline_code(&display_value(value)))
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "_None_".to_string());
    let allowed = if variable.allowed_values.is_empty() {
        "_Any_".to_string()
    } else {
        variable
            .allowed_values
            .iter()
            .map(|value| inline_code(&display_value(value)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        if name.is_empty() { "-".to_string() } else { name.to_string() },
        description.to_string(),
        default,
        allowed,
    ]
}

#[cfg(test)]
mod tests {
    use crate::document::AsyncApiDocument;
    use crate::renderer::{DocumentRenderer, RenderConfig};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render_servers(document: Value) -> String {
        let document = AsyncApiDocument::new(document).unwrap();
        let config = RenderConfig::default();
        DocumentRenderer::new(&document, &config)
            .render_servers()
            .unwrap()
    }

    #[test]
    fn test_render_servers() {
        let markdown = render_servers(json!({
            "asyncapi": "2.6.0",
            "servers": {
                "development": {
                    "url": "development.gigantic-server.com",
                    "description": "Development server",
                    "protocol": "amqp",
                    "protocolVersion": "0.9.1"
                },
                "production": {
                    "url": "api.gigantic-server.com",
                    "description": "Production server",
                    "protocol": "amqp",
                    "protocolVersion": "0.9.1"
                }
            }
        }));

        let expected = "\
## Servers

### `development` Server

* URL: `development.gigantic-server.com`
* Protocol: `amqp 0.9.1`

Development server

### `production` Server

* URL: `api.gigantic-server.com`
* Protocol: `amqp 0.9.1`

Production server

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_server_variables() {
        let markdown = render_servers(json!({
            "asyncapi": "2.6.0",
            "servers": {
                "production": {
                    "url": "{username}.gigantic-server.com:{port}/{basePath}",
                    "description": "The production API server",
                    "protocol": "secure-mqtt",
                    "variables": {
                        "username": {
                            "description": "This value is assigned by the service provider, in this example `gigantic-server.com`"
                        },
                        "port": { "enum": ["8883", "8884"], "default": "8883" },
                        "basePath": { "default": "v2" }
                    }
                }
            }
        }));

        let expected = "\
## Servers

### `production` Server

* URL: `{username}.gigantic-server.com:{port}/{basePath}`
* Protocol: `secure-mqtt`

The production API server

#### URL Variables

| Name | Description | Default value | Allowed values |
|---|---|---|---|
| username | This value is assigned by the service provider, in this example `gigantic-server.com` | _None_ | _Any_ |
| port | - | `8883` | `8883`, `8884` |
| basePath | - | `v2` | _Any_ |

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_kafka_server_security() {
        let markdown = render_servers(json!({
            "asyncapi": "2.6.0",
            "servers": {
                "test": {
                    "url": "test.mykafkacluster.org:8092",
                    "protocol": "kafka-secure",
                    "description": "Test broker",
                    "security": [{ "saslScram": [] }]
                }
            },
            "components": {
                "securitySchemes": {
                    "saslScram": {
                        "type": "scramSha512",
                        "description": "Create credentials in the dev portal."
                    }
                }
            }
        }));

        let expected = "\
## Servers

### `test` Server

* URL: `test.mykafkacluster.org:8092`
* Protocol: `kafka-secure`

Test broker

#### Security

##### Security Requirement 1

* Type: `ScramSha512`
  * security.protocol: SASL_SSL
  * sasl.mechanism: SCRAM-SHA-512

  Create credentials in the dev portal.

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_server_bindings_and_extensions() {
        let markdown = render_servers(json!({
            "asyncapi": "3.0.0",
            "servers": {
                "broker": {
                    "host": "broker.example.com",
                    "protocol": "mqtt",
                    "bindings": { "mqtt": { "clientId": "guest", "bindingVersion": "0.2.0" } },
                    "x-region": "eu-west-1"
                }
            }
        }));

        assert!(markdown.contains("* URL: `mqtt://broker.example.com`\n"));
        assert!(markdown.contains("#### `mqtt` Server specific information\n\n"));
        assert!(markdown.contains("| clientId | - | - | `\"guest\"` | - | - |\n"));
        assert!(markdown.contains("#### Server Extensions\n\n"));
        assert!(markdown.contains("| x-region | - | - | `\"eu-west-1\"` | - | - |\n"));
    }

    #[test]
    fn test_no_servers() {
        assert_eq!(render_servers(json!({ "asyncapi": "2.6.0" })), "");
    }
}
