//! Typed views over a loaded AsyncAPI document.
//!
//! The document tree stays a `serde_json::Value`; the structs in this module are
//! deserialized from it on demand, after the `$ref` chain of the accessed object has
//! been followed. Fields that may themselves be references (tags, external docs,
//! messages, bindings, schemas) are kept as raw values and resolved when used.

use crate::detector::{SpecVersion, VersionDetector};
use crate::error::Result;
use crate::parser::ParsedDocument;
use crate::refs;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(display_value(&Value::deserialize(deserializer)?))
}

/// Text of a scalar the way a reader expects it: strings without quotes, other
/// values as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Vendor extensions captured next to the known fields of an object.
pub type Extensions = IndexMap<String, Value>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    /// 3.x only; 2.x keeps tags at the document root
    #[serde(default)]
    pub tags: Vec<Value>,
    /// 3.x only
    pub external_docs: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub external_docs: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExternalDocs {
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
}

/// A server definition of either major version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// 2.x
    pub url: Option<String>,
    /// 3.x
    pub host: Option<String>,
    /// 3.x
    pub pathname: Option<String>,
    #[serde(default)]
    pub protocol: String,
    pub protocol_version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
    #[serde(default)]
    pub security: Vec<Value>,
    pub bindings: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Server {
    /// The connection URL; 3.x servers combine protocol, host and pathname.
    pub fn address(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let host = self.host.as_deref().unwrap_or_default();
        let pathname = self.pathname.as_deref().unwrap_or_default();
        if self.protocol.is_empty() {
            format!("{}{}", host, pathname)
        } else {
            format!("{}://{}{}", self.protocol, host, pathname)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerVariable {
    pub description: Option<String>,
    pub default: Option<Value>,
    #[serde(rename = "enum", default)]
    pub allowed_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: String,
    pub description: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub scheme: Option<String>,
    pub bearer_format: Option<String>,
    pub open_id_connect_url: Option<String>,
    #[serde(default)]
    pub flows: IndexMap<String, OAuthFlow>,
    /// 3.x: scopes required when the scheme is referenced directly
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, Value>,
    /// 3.x name of `scopes`
    #[serde(default)]
    pub available_scopes: IndexMap<String, Value>,
}

impl OAuthFlow {
    pub fn scope_names(&self) -> Vec<&str> {
        self.scopes
            .keys()
            .chain(self.available_scopes.keys())
            .map(String::as_str)
            .collect()
    }
}

/// One entry of a security requirement: a scheme plus the scopes it must grant.
#[derive(Debug, Clone)]
pub struct RequiredScheme {
    pub scheme: SecurityScheme,
    pub scopes: Vec<String>,
}

/// All schemes that have to be satisfied together.
#[derive(Debug, Clone, Default)]
pub struct SecurityRequirement {
    pub schemes: Vec<RequiredScheme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    /// 3.x
    pub address: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
    /// Server names (2.x) or server references (3.x)
    #[serde(default)]
    pub servers: Vec<Value>,
    /// 3.x
    #[serde(default)]
    pub messages: IndexMap<String, Value>,
    /// 2.x
    pub publish: Option<Value>,
    /// 2.x
    pub subscribe: Option<Value>,
    pub bindings: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub description: Option<String>,
    /// 2.x
    pub schema: Option<Value>,
    pub location: Option<String>,
    /// 3.x
    #[serde(rename = "enum")]
    pub allowed_values: Option<Vec<Value>>,
    /// 3.x
    pub default: Option<Value>,
    /// 3.x
    pub examples: Option<Vec<Value>>,
}

impl Parameter {
    /// Schema describing the parameter value.
    ///
    /// 3.x parameters carry no schema; they are always strings, optionally narrowed
    /// by `enum`, `default` and `examples`.
    pub fn schema_value(&self, version: SpecVersion) -> Option<Value> {
        if let Some(schema) = &self.schema {
            return Some(schema.clone());
        }
        if version == SpecVersion::V2 {
            return None;
        }
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("string"));
        if let Some(values) = &self.allowed_values {
            schema.insert("enum".to_string(), Value::Array(values.clone()));
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(examples) = &self.examples {
            schema.insert("examples".to_string(), Value::Array(examples.clone()));
        }
        Some(Value::Object(schema))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// 3.x: `send` or `receive`
    pub action: Option<String>,
    /// 3.x
    pub channel: Option<Value>,
    pub operation_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub security: Vec<Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
    pub external_docs: Option<Value>,
    pub bindings: Option<Value>,
    /// 2.x: one message or `{ oneOf: [...] }`
    pub message: Option<Value>,
    /// 3.x
    #[serde(default)]
    pub messages: Vec<Value>,
    /// 3.x
    pub reply: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationReply {
    pub address: Option<Value>,
    pub channel: Option<Value>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyAddress {
    #[serde(default)]
    pub location: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrelationId {
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageExample {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub headers: Option<Value>,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub name: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub message_id: Option<String>,
    pub correlation_id: Option<Value>,
    pub external_docs: Option<Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
    pub bindings: Option<Value>,
    #[serde(default)]
    pub examples: Vec<MessageExample>,
    pub headers: Option<Value>,
    pub payload: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Unwraps a 3.x multi-format schema (`{ schemaFormat, schema }`).
pub fn schema_of(value: &Value) -> &Value {
    match (value.get("schemaFormat"), value.get("schema")) {
        (Some(_), Some(schema)) => schema,
        _ => value,
    }
}

/// A loaded document together with its detected version.
#[derive(Debug, Clone)]
pub struct AsyncApiDocument {
    version: SpecVersion,
    root: Value,
}

impl AsyncApiDocument {
    /// Wraps a document tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the document declares no supported AsyncAPI version.
    pub fn new(root: Value) -> Result<Self> {
        let version = VersionDetector::detect_root(&root)?;
        Ok(Self { version, root })
    }

    /// Wraps a parsed file.
    ///
    /// # Errors
    ///
    /// Returns an error when the document declares no supported AsyncAPI version.
    pub fn from_parsed(parsed: ParsedDocument) -> Result<Self> {
        let version = VersionDetector::detect(&parsed)?;
        Ok(Self {
            version,
            root: parsed.root,
        })
    }

    pub fn version(&self) -> SpecVersion {
        self.version
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Follows the `$ref` chain of a value inside this document.
    ///
    /// # Errors
    ///
    /// Returns an error for dangling references.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> Result<&'a Value> {
        refs::dereference(&self.root, value)
    }

    /// Resolves a value and deserializes it into one of the typed views.
    ///
    /// # Errors
    ///
    /// Returns an error for dangling references and values of the wrong shape.
    pub fn view<T: DeserializeOwned>(&self, value: &Value) -> Result<T> {
        let resolved = self.resolve(value)?;
        Ok(T::deserialize(resolved)?)
    }

    /// Like [`AsyncApiDocument::view`], logging failures and falling back to `None`.
    pub fn view_or_warn<T: DeserializeOwned>(&self, value: &Value, what: &str) -> Option<T> {
        match self.view(value) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("Skipping {}: {}", what, e);
                None
            }
        }
    }

    /// Resolves an object and merges its `traits` into it.
    ///
    /// Fields declared on the object win over the ones coming from traits; traits
    /// listed first win over later ones.
    ///
    /// # Errors
    ///
    /// Returns an error for dangling references in the object or its traits.
    pub fn with_traits(&self, value: &Value) -> Result<Value> {
        let resolved = self.resolve(value)?;
        let Some(object) = resolved.as_object() else {
            return Ok(resolved.clone());
        };

        let mut merged: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| key.as_str() != "traits")
            .map(|(key, field)| (key.clone(), field.clone()))
            .collect();
        if let Some(Value::Array(traits)) = object.get("traits") {
            for item in traits {
                if let Value::Object(fields) = self.resolve(item)? {
                    for (key, field) in fields {
                        if !merged.contains_key(key) {
                            merged.insert(key.clone(), field.clone());
                        }
                    }
                }
            }
        }
        Ok(Value::Object(merged))
    }

    pub fn info(&self) -> Result<Info> {
        match self.root.get("info") {
            Some(info) => self.view(info),
            None => Ok(Info::default()),
        }
    }

    /// The document identifier (`id` field).
    pub fn id(&self) -> Option<&str> {
        self.root.get("id").and_then(Value::as_str)
    }

    pub fn default_content_type(&self) -> Option<&str> {
        self.root.get("defaultContentType").and_then(Value::as_str)
    }

    /// Document-level tags: the root `tags` in 2.x, `info.tags` in 3.x.
    pub fn tags(&self) -> Vec<Tag> {
        let tags = match self.version {
            SpecVersion::V2 => self.root.get("tags"),
            SpecVersion::V3 => self.root.get("info").and_then(|info| info.get("tags")),
        };
        match tags {
            Some(Value::Array(tags)) => self.tag_list(tags),
            _ => Vec::new(),
        }
    }

    /// Document-level external docs: root in 2.x, `info.externalDocs` in 3.x.
    pub fn external_docs(&self) -> Option<ExternalDocs> {
        let docs = match self.version {
            SpecVersion::V2 => self.root.get("externalDocs"),
            SpecVersion::V3 => self
                .root
                .get("info")
                .and_then(|info| info.get("externalDocs")),
        };
        self.external_docs_of(docs)
    }

    /// Resolves a list of tag objects, skipping broken ones.
    pub fn tag_list(&self, tags: &[Value]) -> Vec<Tag> {
        tags.iter()
            .filter_map(|tag| self.view_or_warn(tag, "tag"))
            .collect()
    }

    /// Resolves an optional external docs object; one without a URL counts as absent.
    pub fn external_docs_of(&self, docs: Option<&Value>) -> Option<ExternalDocs> {
        docs.and_then(|docs| self.view_or_warn::<ExternalDocs>(docs, "external docs"))
            .filter(|docs| !docs.url.is_empty())
    }

    /// Servers in document order.
    pub fn servers(&self) -> Result<Vec<(String, Server)>> {
        let Some(Value::Object(servers)) = self.root.get("servers") else {
            return Ok(Vec::new());
        };
        servers
            .iter()
            .map(|(name, server)| Ok((name.clone(), self.view(server)?)))
            .collect()
    }

    pub fn server_count(&self) -> usize {
        self.root
            .get("servers")
            .and_then(Value::as_object)
            .map(Map::len)
            .unwrap_or(0)
    }

    /// Channels in document order, keyed by their name (2.x) or id (3.x).
    pub fn channels(&self) -> Result<Vec<(String, Channel)>> {
        let Some(Value::Object(channels)) = self.root.get("channels") else {
            return Ok(Vec::new());
        };
        channels
            .iter()
            .map(|(name, channel)| Ok((name.clone(), self.view(channel)?)))
            .collect()
    }

    /// Resolves a message, applying its traits.
    ///
    /// # Errors
    ///
    /// Returns an error for dangling references and malformed messages.
    pub fn message(&self, value: &Value) -> Result<Message> {
        let merged = self.with_traits(value)?;
        Ok(Message::deserialize(&merged)?)
    }

    /// Resolves an operation, applying its traits.
    ///
    /// # Errors
    ///
    /// Returns an error for dangling references and malformed operations.
    pub fn operation(&self, value: &Value) -> Result<Operation> {
        let merged = self.with_traits(value)?;
        Ok(Operation::deserialize(&merged)?)
    }

    fn security_scheme(&self, name: &str) -> Option<SecurityScheme> {
        let scheme = self
            .root
            .get("components")
            .and_then(|components| components.get("securitySchemes"))
            .and_then(|schemes| schemes.get(name));
        match scheme {
            Some(scheme) => self.view_or_warn(scheme, "security scheme"),
            None => {
                warn!("Unknown security scheme: {}", name);
                None
            }
        }
    }

    /// Normalizes a `security` list into requirements.
    ///
    /// In 2.x every entry maps scheme names (looked up in `components`) to scopes. In
    /// 3.x every entry is a scheme on its own. Entries whose schemes cannot be found
    /// are dropped.
    pub fn security_requirements(&self, security: &[Value]) -> Vec<SecurityRequirement> {
        let requirements: Vec<SecurityRequirement> = match self.version {
            SpecVersion::V2 => security
                .iter()
                .filter_map(Value::as_object)
                .map(|requirement| SecurityRequirement {
                    schemes: requirement
                        .iter()
                        .filter_map(|(name, scopes)| {
                            let scheme = self.security_scheme(name)?;
                            let scopes = scopes
                                .as_array()
                                .map(|scopes| scopes.iter().map(display_value).collect())
                                .unwrap_or_default();
                            Some(RequiredScheme { scheme, scopes })
                        })
                        .collect(),
                })
                .collect(),
            SpecVersion::V3 => security
                .iter()
                .filter_map(|entry| self.view_or_warn::<SecurityScheme>(entry, "security scheme"))
                .map(|scheme| SecurityRequirement {
                    schemes: vec![RequiredScheme {
                        scopes: scheme.scopes.clone(),
                        scheme,
                    }],
                })
                .collect(),
        };

        let requirements: Vec<SecurityRequirement> = requirements
            .into_iter()
            .filter(|requirement| !requirement.schemes.is_empty())
            .collect();
        debug!("Resolved {} security requirement(s)", requirements.len());
        requirements
    }
}
