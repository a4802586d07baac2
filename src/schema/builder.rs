use log::{debug, warn};
use serde_json::{Map, Value};

use super::{
    Dependency, ExternalDocs, Items, ObjectSchema, SchemaArena, SchemaId, SchemaNode, TypeKeyword,
};
use crate::refs::{reference_of, resolve_pointer};

/// Converts JSON Schema values into arena nodes.
///
/// Local `$ref`s are resolved against `document` and memoized in the arena by their
/// target string: every reference to the same target yields the same [`SchemaId`], and
/// a reference that points back at one of its own ancestors closes a cycle instead of
/// recursing.
pub struct SchemaBuilder<'a> {
    pub(super) arena: &'a mut SchemaArena,
    pub(super) document: &'a Value,
}

impl<'a> SchemaBuilder<'a> {
    /// Create a builder resolving references against `document`
    pub fn new(arena: &'a mut SchemaArena, document: &'a Value) -> Self {
        Self { arena, document }
    }

    /// Build the document itself as a schema, registered under the `#` reference
    pub fn build_document_root(&mut self) -> SchemaId {
        self.build_reference("#")
    }

    /// Build a schema value (inline schema, boolean schema or `$ref`)
    pub fn build(&mut self, value: &Value) -> SchemaId {
        if let Some(reference) = reference_of(value) {
            return self.build_reference(reference);
        }
        let id = self.arena.reserve();
        self.fill(id, value);
        id
    }

    /// Build the node a `$ref` points at, reusing the node if it was built before
    pub fn build_reference(&mut self, reference: &str) -> SchemaId {
        if let Some(id) = self.arena.reference(reference) {
            return id;
        }

        let id = self.arena.reserve();
        self.arena.remember_reference(reference, id);

        let document = self.document;
        match resolve_pointer(document, reference) {
            Some(target) => {
                if let Some(next) = reference_of(target) {
                    // reference to a reference: share the final node's content
                    let inner = self.build_reference(next);
                    let node = self.arena.node(inner).clone();
                    let hints = self.arena.hints(inner);
                    self.arena.replace(id, node);
                    self.arena.set_hints(id, hints);
                    if let Some(extensions) = self.arena.extension_schema(inner) {
                        self.arena.set_extension_schema(id, extensions);
                    }
                } else {
                    debug!("Building schema for reference {}", reference);
                    self.fill(id, target);
                }
            }
            None => {
                warn!("Could not resolve schema reference: {}", reference);
                self.arena
                    .replace(id, SchemaNode::Unresolved(reference.to_string()));
            }
        }
        id
    }

    fn fill(&mut self, id: SchemaId, value: &Value) {
        let node = match value {
            Value::Bool(accepts) => SchemaNode::Bool(*accepts),
            Value::Object(map) => SchemaNode::Object(Box::new(self.convert_object(map))),
            other => SchemaNode::Unresolved(format!("not a schema: {}", other)),
        };

        let extensions = match &node {
            SchemaNode::Object(schema) => schema.custom_extensions(),
            _ => Default::default(),
        };
        self.arena.replace(id, node);

        if !extensions.is_empty() {
            let map: Map<String, Value> = extensions.into_iter().collect();
            let synthetic = self.json_to_schema(&Value::Object(map));
            self.arena.set_extension_schema(id, synthetic);
        }
    }

    fn convert_object(&mut self, map: &Map<String, Value>) -> ObjectSchema {
        let mut schema = ObjectSchema::default();
        let mut exclusive_minimum_flag = false;
        let mut exclusive_maximum_flag = false;

        for (key, value) in map {
            match key.as_str() {
                "type" => schema.schema_type = parse_type(value),
                "const" => schema.const_value = Some(value.clone()),
                "enum" => schema.enum_values = value.as_array().cloned(),
                "properties" => schema.properties = self.build_map(value),
                "patternProperties" => schema.pattern_properties = self.build_map(value),
                "additionalProperties" => schema.additional_properties = Some(self.build(value)),
                "items" => {
                    schema.items = Some(match value {
                        Value::Array(list) => {
                            Items::Tuple(list.iter().map(|item| self.build(item)).collect())
                        }
                        single => Items::Single(self.build(single)),
                    })
                }
                "additionalItems" => schema.additional_items = Some(self.build(value)),
                "required" => schema.required = string_list(value),
                "dependencies" => {
                    if let Some(entries) = value.as_object() {
                        for (property, dependency) in entries {
                            let dependency = match dependency {
                                Value::Array(_) => Dependency::Required(string_list(dependency)),
                                other => Dependency::Schema(self.build(other)),
                            };
                            schema.dependencies.insert(property.clone(), dependency);
                        }
                    }
                }
                "dependentRequired" => {
                    if let Some(entries) = value.as_object() {
                        for (property, names) in entries {
                            schema
                                .dependencies
                                .insert(property.clone(), Dependency::Required(string_list(names)));
                        }
                    }
                }
                "dependentSchemas" => {
                    if let Some(entries) = value.as_object() {
                        for (property, dependency) in entries {
                            let id = self.build(dependency);
                            schema
                                .dependencies
                                .insert(property.clone(), Dependency::Schema(id));
                        }
                    }
                }
                "oneOf" => schema.one_of = self.build_list(value),
                "anyOf" => schema.any_of = self.build_list(value),
                "allOf" => schema.all_of = self.build_list(value),
                "not" => schema.not = Some(self.build(value)),
                "propertyNames" => schema.property_names = Some(self.build(value)),
                "contains" => schema.contains = Some(self.build(value)),
                "if" => schema.if_schema = Some(self.build(value)),
                "then" => schema.then_schema = Some(self.build(value)),
                "else" => schema.else_schema = Some(self.build(value)),
                "minimum" => schema.minimum = value.as_f64(),
                "maximum" => schema.maximum = value.as_f64(),
                "exclusiveMinimum" => match value {
                    Value::Bool(flag) => exclusive_minimum_flag = *flag,
                    other => schema.exclusive_minimum = other.as_f64(),
                },
                "exclusiveMaximum" => match value {
                    Value::Bool(flag) => exclusive_maximum_flag = *flag,
                    other => schema.exclusive_maximum = other.as_f64(),
                },
                "multipleOf" => schema.multiple_of = value.as_f64(),
                "minLength" => schema.min_length = value.as_u64(),
                "maxLength" => schema.max_length = value.as_u64(),
                "pattern" => schema.pattern = string_value(value),
                "format" => schema.format = string_value(value),
                "contentMediaType" => schema.content_media_type = string_value(value),
                "contentEncoding" => schema.content_encoding = string_value(value),
                "minItems" => schema.min_items = value.as_u64(),
                "maxItems" => schema.max_items = value.as_u64(),
                "uniqueItems" => schema.unique_items = value.as_bool().unwrap_or(false),
                "minProperties" => schema.min_properties = value.as_u64(),
                "maxProperties" => schema.max_properties = value.as_u64(),
                "title" => schema.title = string_value(value),
                "description" => schema.description = string_value(value),
                "externalDocs" => schema.external_docs = external_docs(value),
                "deprecated" => schema.deprecated = value.as_bool().unwrap_or(false),
                "readOnly" => schema.read_only = value.as_bool().unwrap_or(false),
                "writeOnly" => schema.write_only = value.as_bool().unwrap_or(false),
                "default" => schema.default = Some(value.clone()),
                "examples" => {
                    schema.examples = Some(match value {
                        Value::Array(list) => list.clone(),
                        single => vec![single.clone()],
                    })
                }
                extension if extension.starts_with("x-") => {
                    schema.extensions.insert(key.clone(), value.clone());
                }
                _ => {}
            }
        }

        // draft 4 spelled exclusive bounds as flags on minimum/maximum
        if exclusive_minimum_flag && schema.exclusive_minimum.is_none() {
            schema.exclusive_minimum = schema.minimum.take();
        }
        if exclusive_maximum_flag && schema.exclusive_maximum.is_none() {
            schema.exclusive_maximum = schema.maximum.take();
        }

        schema
    }

    fn build_map(&mut self, value: &Value) -> indexmap::IndexMap<String, SchemaId> {
        value
            .as_object()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, schema)| (name.clone(), self.build(schema)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn build_list(&mut self, value: &Value) -> Option<Vec<SchemaId>> {
        value
            .as_array()
            .map(|list| list.iter().map(|schema| self.build(schema)).collect())
    }
}

fn parse_type(value: &Value) -> Option<TypeKeyword> {
    match value {
        Value::String(label) => Some(TypeKeyword::Single(label.clone())),
        Value::Array(labels) => Some(TypeKeyword::Multiple(
            labels
                .iter()
                .filter_map(|label| label.as_str().map(str::to_string))
                .collect(),
        )),
        _ => None,
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn external_docs(value: &Value) -> Option<ExternalDocs> {
    let url = value.get("url")?.as_str()?.to_string();
    let description = value
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(ExternalDocs { url, description })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_object_keywords() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "integer", "minimum": 0, "exclusiveMaximum": 10 },
                "tags": { "type": "array", "items": { "type": "string" }, "uniqueItems": true }
            },
            "x-internal": true
        }));

        let schema = arena.object(root).unwrap();
        assert_eq!(schema.schema_type, Some(TypeKeyword::Single("object".into())));
        assert_eq!(schema.required, vec!["id".to_string()]);
        assert_eq!(schema.properties.len(), 2);
        assert!(schema.extensions.contains_key("x-internal"));
        assert!(arena.extension_schema(root).is_some());

        let id = arena.object(schema.properties["id"]).unwrap();
        assert_eq!(id.minimum, Some(0.0));
        assert_eq!(id.exclusive_maximum, Some(10.0));

        let tags = arena.object(schema.properties["tags"]).unwrap();
        assert!(tags.unique_items);
        assert!(matches!(tags.items, Some(Items::Single(_))));
    }

    #[test]
    fn test_draft4_exclusive_flags() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "type": "number",
            "minimum": 1,
            "exclusiveMinimum": true,
            "maximum": 5,
            "exclusiveMaximum": false
        }));

        let schema = arena.object(root).unwrap();
        assert_eq!(schema.minimum, None);
        assert_eq!(schema.exclusive_minimum, Some(1.0));
        assert_eq!(schema.maximum, Some(5.0));
        assert_eq!(schema.exclusive_maximum, None);
    }

    #[test]
    fn test_recursive_reference_closes_cycle() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "type": "object",
            "properties": {
                "self": { "$ref": "#" },
                "children": { "type": "array", "items": { "$ref": "#" } }
            }
        }));

        let schema = arena.object(root).unwrap();
        assert_eq!(schema.properties["self"], root);

        let children = arena.object(schema.properties["children"]).unwrap();
        assert_eq!(children.items, Some(Items::Single(root)));
    }

    #[test]
    fn test_mutual_references_through_definitions() {
        let document = json!({
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": { "edge": { "$ref": "#/definitions/Edge" } }
                },
                "Edge": {
                    "type": "object",
                    "properties": { "target": { "$ref": "#/definitions/Node" } }
                }
            }
        });
        let mut arena = SchemaArena::new();
        let node = SchemaBuilder::new(&mut arena, &document).build_reference("#/definitions/Node");

        let edge = arena.object(node).unwrap().properties["edge"];
        let target = arena.object(edge).unwrap().properties["target"];
        assert_eq!(target, node);
    }

    #[test]
    fn test_unresolved_reference_becomes_unresolved_node() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "properties": { "missing": { "$ref": "#/definitions/Nope" } }
        }));

        let missing = arena.object(root).unwrap().properties["missing"];
        assert!(matches!(arena.node(missing), SchemaNode::Unresolved(_)));
    }

    #[test]
    fn test_dependencies_variants() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "dependencies": {
                "creditCard": ["billingAddress"],
                "shipping": { "required": ["address"] }
            },
            "dependentRequired": { "firstName": ["lastName"] }
        }));

        let schema = arena.object(root).unwrap();
        assert_eq!(
            schema.dependencies["creditCard"],
            Dependency::Required(vec!["billingAddress".to_string()])
        );
        assert!(matches!(schema.dependencies["shipping"], Dependency::Schema(_)));
        assert_eq!(
            schema.dependencies["firstName"],
            Dependency::Required(vec!["lastName".to_string()])
        );
    }

    #[test]
    fn test_boolean_and_tuple_items() {
        let (arena, root) = SchemaArena::from_json(&json!({
            "type": "array",
            "items": [{ "type": "string" }, true],
            "additionalItems": false
        }));

        let schema = arena.object(root).unwrap();
        match &schema.items {
            Some(Items::Tuple(ids)) => {
                assert_eq!(ids.len(), 2);
                assert!(matches!(arena.node(ids[1]), SchemaNode::Bool(true)));
            }
            other => panic!("expected tuple items, got {:?}", other),
        }
        let additional = schema.additional_items.unwrap();
        assert!(matches!(arena.node(additional), SchemaNode::Bool(false)));
    }
}
