//! Security requirements of servers and operations.

use super::{end_block, DocumentRenderer};
use crate::document::{OAuthFlow, SecurityRequirement, SecurityScheme};
use crate::markdown::{header, indent, inline_code, link, list_item, table};
use serde_json::Value;

const KAFKA_PROTOCOL: &str = "kafka";
const KAFKA_SECURE_PROTOCOL: &str = "kafka-secure";

const FLOW_HEADERS: [&str; 5] = ["Flow", "Auth URL", "Token URL", "Refresh URL", "Scopes"];

/// Human-readable label of a security scheme type.
pub fn security_type_label(scheme_type: &str) -> &'static str {
    match scheme_type {
        "apiKey" => "API key",
        "oauth2" => "OAuth2",
        "openIdConnect" => "Open ID",
        "http" => "HTTP",
        "userPassword" => "User/Password",
        "X509" => "X509",
        "symmetricEncryption" => "Symmetric Encription",
        "asymmetricEncryption" => "Asymmetric Encription",
        "httpApiKey" => "HTTP API key",
        "scramSha256" => "ScramSha256",
        "scramSha512" => "ScramSha512",
        "gssapi" => "GSSAPI",
        "plain" => "PLAIN",
        _ => "API key",
    }
}

/// Human-readable name of an OAuth2 flow.
pub fn flow_name(flow: &str) -> &'static str {
    match flow {
        "password" => "Password",
        "clientCredentials" => "Client credentials",
        "authorizationCode" => "Authorization Code",
        _ => "Implicit",
    }
}

/// Kafka client settings implied by a protocol and an optional security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KafkaSecurity {
    pub security_protocol: &'static str,
    pub sasl_mechanism: Option<&'static str>,
}

/// `security.protocol` and `sasl.mechanism` for a Kafka server.
///
/// `kafka` is plaintext and every other protocol is treated as TLS; a security
/// scheme switches either to SASL, except for `X509` which means plain TLS.
pub fn kafka_security(protocol: &str, scheme: Option<&SecurityScheme>) -> KafkaSecurity {
    let mut security_protocol = match (protocol == KAFKA_PROTOCOL, scheme.is_some()) {
        (true, false) => "PLAINTEXT",
        (true, true) => "SASL_PLAINTEXT",
        (false, false) => "SSL",
        (false, true) => "SASL_SSL",
    };

    let mut sasl_mechanism = None;
    if let Some(scheme) = scheme {
        match scheme.scheme_type.as_str() {
            "oauth2" => sasl_mechanism = Some("OAUTHBEARER"),
            "gssapi" => sasl_mechanism = Some("GSSAPI"),
            "plain" => sasl_mechanism = Some("PLAIN"),
            "scramSha256" => sasl_mechanism = Some("SCRAM-SHA-256"),
            "scramSha512" => sasl_mechanism = Some("SCRAM-SHA-512"),
            "X509" => security_protocol = "SSL",
            _ => {}
        }
    }

    KafkaSecurity {
        security_protocol,
        sasl_mechanism,
    }
}

fn is_kafka(protocol: Option<&str>) -> bool {
    matches!(protocol, Some(KAFKA_PROTOCOL) | Some(KAFKA_SECURE_PROTOCOL))
}

fn optional_link(url: Option<&str>) -> String {
    match url {
        Some(url) if !url.is_empty() => link(url, url),
        _ => "-".to_string(),
    }
}

fn code_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(inline_code)
        .collect::<Vec<_>>()
        .join(", ")
}

fn flows_table(flows: &[(&String, &OAuthFlow)]) -> String {
    let rows: Vec<Vec<String>> = flows
        .iter()
        .map(|(name, flow)| {
            let scopes = flow.scope_names();
            vec![
                flow_name(name).to_string(),
                optional_link(flow.authorization_url.as_deref()),
                optional_link(flow.token_url.as_deref()),
                optional_link(flow.refresh_url.as_deref()),
                if scopes.is_empty() {
                    "-".to_string()
                } else {
                    code_list(scopes)
                },
            ]
        })
        .collect();
    table(&FLOW_HEADERS, &rows)
}

/// Markdown for one scheme of a requirement.
fn security_item(protocol: Option<&str>, scheme: Option<&SecurityScheme>, scopes: &[String]) -> String {
    let mut out = String::new();
    if let Some(scheme) = scheme.filter(|scheme| !scheme.scheme_type.is_empty()) {
        out.push_str(&list_item(&format!(
            "Type: {}",
            inline_code(security_type_label(&scheme.scheme_type))
        )));
    }

    let mut details = String::new();
    if let Some(scheme) = scheme {
        if let Some(name) = &scheme.name {
            details.push_str(&list_item(&format!("Name: {}", name)));
        }
        if let Some(location) = &scheme.location {
            details.push_str(&list_item(&format!("In: {}", location)));
        }
        if let Some(kind) = &scheme.scheme {
            details.push_str(&list_item(&format!("Scheme: {}", kind)));
        }
        if let Some(format) = &scheme.bearer_format {
            details.push_str(&list_item(&format!("Bearer format: {}", format)));
        }
        if let Some(url) = &scheme.open_id_connect_url {
            details.push_str(&list_item(&format!("OpenID Connect URL: {}", link(url, url))));
        }
    }

    if let Some(protocol) = protocol.filter(|_| is_kafka(protocol)) {
        let kafka = kafka_security(protocol, scheme);
        details.push_str(&list_item(&format!(
            "security.protocol: {}",
            kafka.security_protocol
        )));
        if let Some(mechanism) = kafka.sasl_mechanism {
            details.push_str(&list_item(&format!("sasl.mechanism: {}", mechanism)));
        }
    }

    if let Some(scheme) = scheme.filter(|scheme| !scheme.flows.is_empty()) {
        let flows: Vec<(&String, &OAuthFlow)> = scheme.flows.iter().collect();
        let mut body = String::new();
        if !scopes.is_empty() {
            body.push_str(&format!(
                "Required scopes: {}\n\n",
                code_list(scopes.iter().map(String::as_str))
            ));
        }
        body.push_str(&flows_table(&flows));
        details.push_str("* Flows:\n\n");
        details.push_str(&indent(&body, 2));
    }

    out.push_str(&indent(&details, 2));

    if let Some(description) = scheme
        .and_then(|scheme| scheme.description.as_deref())
        .filter(|description| !description.is_empty())
    {
        out.push('\n');
        out.push_str(&indent(description.trim_end(), 2));
        out.push('\n');
    }
    out
}

impl DocumentRenderer<'_> {
    /// A `####` section listing security requirements.
    ///
    /// Kafka servers without usable requirements still get one requirement telling
    /// the client which `security.protocol` to use.
    pub(super) fn render_security(
        &self,
        title: &str,
        protocol: Option<&str>,
        security: &[Value],
    ) -> String {
        let requirements = self.document.security_requirements(security);

        let rendered: Vec<String> = if requirements.is_empty() {
            if !is_kafka(protocol) {
                return String::new();
            }
            vec![security_item(protocol, None, &[])]
        } else {
            requirements
                .iter()
                .map(|requirement| render_requirement(protocol, requirement))
                .collect()
        };

        let mut out = header(4, title);
        for (index, requirement) in rendered.iter().enumerate() {
            out.push_str(&header(5, &format!("Security Requirement {}", index + 1)));
            out.push_str(requirement);
            end_block(&mut out);
        }
        out
    }
}

fn render_requirement(protocol: Option<&str>, requirement: &SecurityRequirement) -> String {
    requirement
        .schemes
        .iter()
        .map(|required| security_item(protocol, Some(&required.scheme), &required.scopes))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AsyncApiDocument;
    use crate::renderer::RenderConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scheme(scheme_type: &str) -> SecurityScheme {
        SecurityScheme {
            scheme_type: scheme_type.to_string(),
            ..SecurityScheme::default()
        }
    }

    #[test]
    fn test_security_type_labels() {
        assert_eq!(security_type_label("apiKey"), "API key");
        assert_eq!(security_type_label("openIdConnect"), "Open ID");
        assert_eq!(security_type_label("symmetricEncryption"), "Symmetric Encription");
        assert_eq!(security_type_label("custom"), "API key");
        assert_eq!(flow_name("clientCredentials"), "Client credentials");
        assert_eq!(flow_name("custom"), "Implicit");
    }

    #[test]
    fn test_kafka_security() {
        assert_eq!(kafka_security("kafka", None).security_protocol, "PLAINTEXT");
        assert_eq!(
            kafka_security("kafka", Some(&scheme(""))).security_protocol,
            "SASL_PLAINTEXT"
        );
        assert_eq!(kafka_security("kafka-secure", None).security_protocol, "SSL");
        assert_eq!(
            kafka_security("kafka-secure", Some(&scheme("plain"))),
            KafkaSecurity {
                security_protocol: "SASL_SSL",
                sasl_mechanism: Some("PLAIN")
            }
        );
        assert_eq!(
            kafka_security("kafka", Some(&scheme("scramSha512"))).sasl_mechanism,
            Some("SCRAM-SHA-512")
        );
        assert_eq!(
            kafka_security("kafka", Some(&scheme("X509"))),
            KafkaSecurity {
                security_protocol: "SSL",
                sasl_mechanism: None
            }
        );
    }

    #[test]
    fn test_render_oauth_flows() {
        let document = AsyncApiDocument::new(json!({
            "asyncapi": "2.6.0",
            "components": {
                "securitySchemes": {
                    "supportedOauthFlows": {
                        "type": "oauth2",
                        "description": "Flows to support OAuth 2.0",
                        "flows": {
                            "implicit": {
                                "authorizationUrl": "https://authserver.example/auth",
                                "scopes": { "streetlights:on": "on", "streetlights:off": "off" }
                            },
                            "password": {
                                "tokenUrl": "https://authserver.example/token",
                                "scopes": {}
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let config = RenderConfig::default();
        let renderer = DocumentRenderer::new(&document, &config);

        let markdown = renderer.render_security(
            "Security",
            Some("mqtt"),
            &[json!({ "supportedOauthFlows": ["streetlights:on"] })],
        );

        let expected = "\
#### Security

##### Security Requirement 1

* Type: `OAuth2`
  * Flows:

    Required scopes: `streetlights:on`

    | Flow | Auth URL | Token URL | Refresh URL | Scopes |
    |---|---|---|---|---|
    | Implicit | [https://authserver.example/auth](https://authserver.example/auth) | - | - | `streetlights:on`, `streetlights:off` |
    | Password | - | [https://authserver.example/token](https://authserver.example/token) | - | - |

  Flows to support OAuth 2.0

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_render_kafka_without_security() {
        let document = AsyncApiDocument::new(json!({ "asyncapi": "2.6.0" })).unwrap();
        let config = RenderConfig::default();
        let renderer = DocumentRenderer::new(&document, &config);

        assert_eq!(
            renderer.render_security("Security", Some("kafka-secure"), &[]),
            "#### Security\n\n##### Security Requirement 1\n\n  * security.protocol: SSL\n\n"
        );
        assert_eq!(renderer.render_security("Security", Some("mqtt"), &[]), "");
    }

    #[test]
    fn test_render_several_schemes_in_one_requirement() {
        let document = AsyncApiDocument::new(json!({
            "asyncapi": "2.6.0",
            "components": {
                "securitySchemes": {
                    "userPassword": { "type": "userPassword" },
                    "apiKey": { "type": "apiKey", "in": "user" }
                }
            }
        }))
        .unwrap();
        let config = RenderConfig::default();
        let renderer = DocumentRenderer::new(&document, &config);

        let markdown = renderer.render_security(
            "Security",
            None,
            &[json!({ "userPassword": [], "apiKey": [] })],
        );

        assert_eq!(
            markdown,
            "#### Security\n\n##### Security Requirement 1\n\n* Type: `User/Password`\n\n* Type: `API key`\n  * In: user\n\n"
        );
    }
}
