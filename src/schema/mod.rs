//! Schema rendering engine.
//!
//! Turns a (possibly cyclic) JSON Schema graph into an ordered list of table rows,
//! one per schema node. The graph lives in a [`SchemaArena`]: nodes are addressed by
//! [`SchemaId`], so two properties that point at the same node share one id and a
//! recursive `$ref` becomes a genuine cycle in the arena.
//!
//! The engine is split along the same lines as the rendering pipeline:
//!
//! 1. [`builder`] - converts JSON values into arena nodes, resolving local `$ref`s
//! 2. [`infer`] - infers the displayed type of a node
//! 3. [`constraints`] - humanizes numeric/string/array/object constraints
//! 4. [`path`] - dotted path names for nested nodes
//! 5. [`circular`] - per-branch ancestor tracking
//! 6. [`row`] - builds the six cells of one row
//! 7. [`traversal`] - walks the graph and assembles the rows
//! 8. [`synthetic`] - schemas synthesized from raw JSON, parameters and extensions
//!
//! # Example
//!
//! ```
//! use asyncapi_markdown::schema::{render_schema_table, SchemaArena, SchemaTableOptions};
//! use serde_json::json;
//!
//! let (arena, root) = SchemaArena::from_json(&json!({
//!     "type": "object",
//!     "properties": { "id": { "type": "integer", "minimum": 1 } }
//! }));
//! let table = render_schema_table(&arena, root, &SchemaTableOptions::untitled());
//! assert!(table.contains("| id | integer | - | - | >= 1 | - |"));
//! ```

pub mod builder;
pub mod circular;
pub mod constraints;
pub mod infer;
pub mod path;
pub mod row;
pub mod synthetic;
pub mod traversal;

pub use builder::SchemaBuilder;
pub use row::SchemaRow;
pub use traversal::{render_schema, render_schema_table, SchemaTableOptions};

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Identity of a node inside a [`SchemaArena`].
///
/// Equality of two ids is reference identity of the underlying node; structurally equal
/// but distinct schemas always get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    /// Position of the node in its arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the schema graph
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// `true` accepts anything, `false` accepts nothing
    Bool(bool),
    /// A regular schema object
    Object(Box<ObjectSchema>),
    /// A value that is not a schema, or a `$ref` that could not be resolved
    Unresolved(String),
}

/// The `type` keyword: a single label or a set of alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKeyword {
    Single(String),
    Multiple(Vec<String>),
}

/// The `items` keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// One schema applied to every element
    Single(SchemaId),
    /// Per-position schemas
    Tuple(Vec<SchemaId>),
}

/// One entry of `dependencies` / `dependentRequired` / `dependentSchemas`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Properties that become required once the owning property is present
    Required(Vec<String>),
    /// Schema that applies once the owning property is present
    Schema(SchemaId),
}

/// External documentation attached to a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDocs {
    pub url: String,
    pub description: Option<String>,
}

/// A schema object with every keyword the renderer understands.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub schema_type: Option<TypeKeyword>,
    pub const_value: Option<Value>,
    pub enum_values: Option<Vec<Value>>,

    pub properties: IndexMap<String, SchemaId>,
    pub pattern_properties: IndexMap<String, SchemaId>,
    pub additional_properties: Option<SchemaId>,
    pub items: Option<Items>,
    pub additional_items: Option<SchemaId>,
    pub required: Vec<String>,
    pub dependencies: IndexMap<String, Dependency>,

    pub one_of: Option<Vec<SchemaId>>,
    pub any_of: Option<Vec<SchemaId>>,
    pub all_of: Option<Vec<SchemaId>>,
    pub not: Option<SchemaId>,
    pub property_names: Option<SchemaId>,
    pub contains: Option<SchemaId>,
    pub if_schema: Option<SchemaId>,
    pub then_schema: Option<SchemaId>,
    pub else_schema: Option<SchemaId>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub content_media_type: Option<String>,
    pub content_encoding: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,

    pub title: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocs>,
    pub deprecated: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub default: Option<Value>,
    pub examples: Option<Vec<Value>>,

    /// Vendor extensions (`x-*` keys) in document order
    pub extensions: IndexMap<String, Value>,
}

/// JSON Schema keywords that imply a type by their mere presence.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "maxLength",
    "minLength",
    "pattern",
    "contentMediaType",
    "contentEncoding",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "items",
    "maxItems",
    "minItems",
    "uniqueItems",
    "contains",
    "additionalItems",
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "patternProperties",
    "propertyNames",
    "dependencies",
    "additionalProperties",
];

impl ObjectSchema {
    /// Names of the keywords present on this schema, in a fixed order.
    pub fn present_keywords(&self) -> Vec<&'static str> {
        let checks = [
            ("type", self.schema_type.is_some()),
            ("const", self.const_value.is_some()),
            ("enum", self.enum_values.is_some()),
            ("properties", !self.properties.is_empty()),
            ("patternProperties", !self.pattern_properties.is_empty()),
            ("additionalProperties", self.additional_properties.is_some()),
            ("items", self.items.is_some()),
            ("additionalItems", self.additional_items.is_some()),
            ("required", !self.required.is_empty()),
            ("dependencies", !self.dependencies.is_empty()),
            ("oneOf", self.one_of.is_some()),
            ("anyOf", self.any_of.is_some()),
            ("allOf", self.all_of.is_some()),
            ("not", self.not.is_some()),
            ("propertyNames", self.property_names.is_some()),
            ("contains", self.contains.is_some()),
            ("if", self.if_schema.is_some()),
            ("then", self.then_schema.is_some()),
            ("else", self.else_schema.is_some()),
            ("minimum", self.minimum.is_some()),
            ("maximum", self.maximum.is_some()),
            ("exclusiveMinimum", self.exclusive_minimum.is_some()),
            ("exclusiveMaximum", self.exclusive_maximum.is_some()),
            ("multipleOf", self.multiple_of.is_some()),
            ("minLength", self.min_length.is_some()),
            ("maxLength", self.max_length.is_some()),
            ("pattern", self.pattern.is_some()),
            ("format", self.format.is_some()),
            ("contentMediaType", self.content_media_type.is_some()),
            ("contentEncoding", self.content_encoding.is_some()),
            ("minItems", self.min_items.is_some()),
            ("maxItems", self.max_items.is_some()),
            ("uniqueItems", self.unique_items),
            ("minProperties", self.min_properties.is_some()),
            ("maxProperties", self.max_properties.is_some()),
            ("title", self.title.is_some()),
            ("description", self.description.is_some()),
            ("externalDocs", self.external_docs.is_some()),
            ("deprecated", self.deprecated),
            ("readOnly", self.read_only),
            ("writeOnly", self.write_only),
            ("default", self.default.is_some()),
            ("examples", self.examples.is_some()),
            ("x-*", !self.extensions.is_empty()),
        ];
        checks
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// `{}`: no keyword at all
    pub fn is_empty(&self) -> bool {
        self.present_keywords().is_empty()
    }

    /// Whether any keyword from [`STRUCTURAL_KEYWORDS`] is present
    pub fn has_structural_keyword(&self) -> bool {
        self.present_keywords()
            .iter()
            .any(|keyword| STRUCTURAL_KEYWORDS.contains(keyword))
    }

    /// Keywords that only make sense for objects are present
    pub fn implies_object(&self) -> bool {
        !self.properties.is_empty()
            || !self.pattern_properties.is_empty()
            || self.additional_properties.is_some()
            || self.property_names.is_some()
            || !self.required.is_empty()
            || !self.dependencies.is_empty()
            || self.min_properties.is_some()
            || self.max_properties.is_some()
    }

    /// Keywords that only make sense for arrays are present
    pub fn implies_array(&self) -> bool {
        self.items.is_some()
            || self.additional_items.is_some()
            || self.contains.is_some()
            || self.min_items.is_some()
            || self.max_items.is_some()
            || self.unique_items
    }

    /// Vendor extensions meant for the reader (parser and private render keys removed)
    pub fn custom_extensions(&self) -> IndexMap<String, Value> {
        custom_extensions(&self.extensions)
    }
}

/// Extension prefixes that never show up in the rendered output
pub const RESERVED_EXTENSION_PREFIXES: &[&str] = &["x-parser-", "x-schema-private-"];

/// Filters out reserved extension keys.
pub fn custom_extensions(extensions: &IndexMap<String, Value>) -> IndexMap<String, Value> {
    extensions
        .iter()
        .filter(|(key, _)| {
            key.starts_with("x-")
                && !RESERVED_EXTENSION_PREFIXES
                    .iter()
                    .any(|prefix| key.starts_with(prefix))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Rendering hints attached to a node out of band.
///
/// Synthetic schemas (parameters, bindings, extensions) need a slightly different
/// presentation than schemas written by the document author; the hints carry that
/// without touching the schema data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHints {
    /// Show the inferred type in the Type cell
    pub render_type: bool,
    /// Show additional properties/items notes and expand `additionalProperties`
    pub render_additional_info: bool,
    /// The node stands for a literal value; its `const` is shown verbatim
    pub raw_value: bool,
    /// Runtime expression of a channel parameter (`$message.payload#/user/id`)
    pub parameter_location: Option<String>,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            render_type: true,
            render_additional_info: true,
            raw_value: false,
            parameter_location: None,
        }
    }
}

impl RenderHints {
    /// Hints for containers synthesized from raw JSON
    pub fn synthetic_container() -> Self {
        Self {
            render_type: false,
            render_additional_info: false,
            ..Self::default()
        }
    }

    /// Hints for literal leaves synthesized from raw JSON
    pub fn raw_value() -> Self {
        Self {
            render_type: false,
            raw_value: true,
            ..Self::default()
        }
    }
}

/// Owner of every node in a schema graph.
#[derive(Debug, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
    hints: HashMap<SchemaId, RenderHints>,
    /// `$ref` target -> node built for it
    references: HashMap<String, SchemaId>,
    /// node -> synthetic object schema built from its vendor extensions
    extension_schemas: HashMap<SchemaId, SchemaId>,
}

impl SchemaArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a standalone schema; `$ref`s resolve against the value itself.
    pub fn from_json(value: &Value) -> (Self, SchemaId) {
        let mut arena = Self::new();
        let root = SchemaBuilder::new(&mut arena, value).build_document_root();
        (arena, root)
    }

    /// Add a node and return its id
    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Add an object node carrying hints
    pub fn alloc_object(&mut self, schema: ObjectSchema, hints: RenderHints) -> SchemaId {
        let id = self.alloc(SchemaNode::Object(Box::new(schema)));
        self.set_hints(id, hints);
        id
    }

    /// Reserve an id whose node is filled in later with [`SchemaArena::replace`]
    pub fn reserve(&mut self) -> SchemaId {
        self.alloc(SchemaNode::Unresolved("unfinished reference".to_string()))
    }

    /// Overwrite a reserved node
    pub fn replace(&mut self, id: SchemaId, node: SchemaNode) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = node;
        }
    }

    /// Node behind an id; ids from another arena degrade to an unresolved node
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        static MISSING: SchemaNode = SchemaNode::Unresolved(String::new());
        self.nodes.get(id.0).unwrap_or(&MISSING)
    }

    /// Object schema behind an id, if it is one
    pub fn object(&self, id: SchemaId) -> Option<&ObjectSchema> {
        match self.node(id) {
            SchemaNode::Object(schema) => Some(schema),
            _ => None,
        }
    }

    /// Rendering hints of a node (defaults when none were set)
    pub fn hints(&self, id: SchemaId) -> RenderHints {
        self.hints.get(&id).cloned().unwrap_or_default()
    }

    /// Attach rendering hints to a node
    pub fn set_hints(&mut self, id: SchemaId, hints: RenderHints) {
        if hints == RenderHints::default() {
            self.hints.remove(&id);
        } else {
            self.hints.insert(id, hints);
        }
    }

    /// Node already built for a `$ref` target
    pub fn reference(&self, target: &str) -> Option<SchemaId> {
        self.references.get(target).copied()
    }

    pub(crate) fn remember_reference(&mut self, target: &str, id: SchemaId) {
        self.references.insert(target.to_string(), id);
    }

    /// Synthetic schema holding the custom extensions of a node
    pub fn extension_schema(&self, id: SchemaId) -> Option<SchemaId> {
        self.extension_schemas.get(&id).copied()
    }

    pub(crate) fn set_extension_schema(&mut self, owner: SchemaId, schema: SchemaId) {
        self.extension_schemas.insert(owner, schema);
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shared_reference_has_one_identity() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "type": "object",
            "properties": {
                "billing": { "$ref": "#/definitions/Address" },
                "shipping": { "$ref": "#/definitions/Address" }
            },
            "definitions": {
                "Address": { "type": "object" }
            }
        }));

        let schema = arena.object(root).unwrap();
        assert_eq!(schema.properties["billing"], schema.properties["shipping"]);
    }

    #[test]
    fn test_equal_inline_schemas_are_distinct() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" }
            }
        }));

        let schema = arena.object(root).unwrap();
        assert_ne!(schema.properties["a"], schema.properties["b"]);
    }

    #[test]
    fn test_empty_schema_detection() {
        assert!(ObjectSchema::default().is_empty());

        let described = ObjectSchema {
            description: Some("anything".to_string()),
            ..ObjectSchema::default()
        };
        assert!(!described.is_empty());
        assert!(!described.has_structural_keyword());
    }

    #[test]
    fn test_custom_extensions_skip_reserved_prefixes() {
        let mut extensions = IndexMap::new();
        extensions.insert("x-visible".to_string(), json!(1));
        extensions.insert("x-parser-message-name".to_string(), json!("m"));
        extensions.insert("x-schema-private-render-type".to_string(), json!(false));

        let custom = custom_extensions(&extensions);
        assert_eq!(custom.len(), 1);
        assert!(custom.contains_key("x-visible"));
    }

    #[test]
    fn test_default_hints_are_not_stored() {
        let mut arena = SchemaArena::new();
        let id = arena.alloc(SchemaNode::Bool(true));
        arena.set_hints(id, RenderHints::default());
        assert_eq!(arena.hints(id), RenderHints::default());

        arena.set_hints(id, RenderHints::raw_value());
        assert!(arena.hints(id).raw_value);
        assert!(!arena.hints(id).render_type);
    }
}
