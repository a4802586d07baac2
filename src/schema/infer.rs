//! Display types for schema nodes.
//!
//! [`infer_type`] looks at the raw keywords of a node and decides on a JSON type label
//! (or a set of them); [`schema_type`] turns that into the text shown in the Type column,
//! expanding arrays into `array<T>` / `tuple<...>` and appending the combinator name.

use serde_json::Value;

use super::{Items, ObjectSchema, SchemaArena, SchemaId, SchemaNode, TypeKeyword};

/// Type of `true`, `{}` and schemas without any type-implying keyword
pub const ANY: &str = "any";
/// Type of `false` and of schemas negating an unconstrained schema
pub const NEVER: &str = "never";
/// Type of nodes that are not schemas at all
pub const UNKNOWN: &str = "unknown";
/// Placeholder used when a type expression refers back to a node being typed
pub const CIRCULAR: &str = "[CIRCULAR]";

/// JSON types a `type` keyword may name
pub const JSON_SCHEMA_TYPES: &[&str] = &[
    "string", "number", "integer", "boolean", "array", "object", "null",
];

/// Result of type inference before display formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferredType {
    /// Type-implying keywords or a combinator are present but no label applies
    Empty,
    Single(String),
    Multiple(Vec<String>),
}

impl InferredType {
    /// Whether the inferred label set names `label`
    pub fn includes(&self, label: &str) -> bool {
        match self {
            InferredType::Empty => false,
            InferredType::Single(single) => single == label,
            InferredType::Multiple(labels) => labels.iter().any(|l| l == label),
        }
    }

    fn from_labels(mut labels: Vec<String>) -> Self {
        if labels.len() == 1 {
            InferredType::Single(labels.remove(0))
        } else {
            InferredType::Multiple(labels)
        }
    }
}

/// Infer the raw type of a node.
pub fn infer_type(arena: &SchemaArena, id: SchemaId) -> InferredType {
    match arena.node(id) {
        SchemaNode::Bool(true) => InferredType::Single(ANY.to_string()),
        SchemaNode::Bool(false) => InferredType::Single(NEVER.to_string()),
        SchemaNode::Unresolved(_) => InferredType::Single(UNKNOWN.to_string()),
        SchemaNode::Object(schema) => infer_object_type(schema),
    }
}

fn infer_object_type(schema: &ObjectSchema) -> InferredType {
    match &schema.schema_type {
        Some(TypeKeyword::Single(label)) => return InferredType::Single(label.clone()),
        Some(TypeKeyword::Multiple(labels)) => {
            let mut labels = labels.clone();
            // `integer` is redundant next to `number`
            if labels.iter().any(|l| l == "integer") && labels.iter().any(|l| l == "number") {
                labels.retain(|l| l != "integer");
            }
            return InferredType::from_labels(labels);
        }
        None => {}
    }

    if let Some(value) = &schema.const_value {
        return InferredType::Single(value_type(value).to_string());
    }

    if let Some(values) = schema.enum_values.as_ref().filter(|values| !values.is_empty()) {
        let mut labels: Vec<String> = Vec::new();
        for value in values {
            let label = value_type(value).to_string();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        return InferredType::from_labels(labels);
    }

    if schema.has_structural_keyword() || combined_type(schema).is_some() {
        return InferredType::Empty;
    }

    InferredType::Single(ANY.to_string())
}

/// JSON type label of a literal value; whole numbers are `integer`.
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) => {
            let whole = number.is_i64()
                || number.is_u64()
                || number.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false);
            if whole {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Name of the single combinator present (`oneOf`, `anyOf`, `allOf`).
///
/// Returns `None` when none or more than one of them is present.
pub fn combined_type(schema: &ObjectSchema) -> Option<&'static str> {
    let present: Vec<&'static str> = [
        ("oneOf", schema.one_of.is_some()),
        ("anyOf", schema.any_of.is_some()),
        ("allOf", schema.all_of.is_some()),
    ]
    .iter()
    .filter(|(_, present)| *present)
    .map(|(name, _)| *name)
    .collect();

    match present.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

/// Displayed type of a node, e.g. `object`, `array<string>`, `string | null`,
/// `tuple<string, ...optional<any>>` or `object oneOf`.
pub fn schema_type(arena: &SchemaArena, id: SchemaId) -> String {
    let mut visiting = Vec::new();
    schema_type_guarded(arena, id, &mut visiting)
}

fn schema_type_guarded(arena: &SchemaArena, id: SchemaId, visiting: &mut Vec<SchemaId>) -> String {
    if visiting.contains(&id) {
        return CIRCULAR.to_string();
    }

    let schema = match arena.node(id) {
        SchemaNode::Bool(true) => return ANY.to_string(),
        SchemaNode::Bool(false) => return NEVER.to_string(),
        SchemaNode::Unresolved(_) => return UNKNOWN.to_string(),
        SchemaNode::Object(schema) => schema,
    };

    if schema.is_empty() {
        return ANY.to_string();
    }
    if let Some(not) = schema.not {
        if infer_type(arena, not) == InferredType::Single(ANY.to_string()) {
            return NEVER.to_string();
        }
    }

    visiting.push(id);
    let display = match infer_object_type(schema) {
        InferredType::Multiple(labels) => labels
            .iter()
            .map(|label| label_type(arena, label, schema, visiting))
            .collect::<Vec<_>>()
            .join(" | "),
        inferred => {
            let label = match inferred {
                InferredType::Single(label) => label_type(arena, &label, schema, visiting),
                _ => String::new(),
            };
            match (label.is_empty(), combined_type(schema)) {
                (false, Some(combined)) => format!("{} {}", label, combined),
                (true, Some(combined)) => combined.to_string(),
                (_, None) => label,
            }
        }
    };
    visiting.pop();
    display
}

/// Expand the `array` label using the item schemas; other labels pass through.
fn label_type(
    arena: &SchemaArena,
    label: &str,
    schema: &ObjectSchema,
    visiting: &mut Vec<SchemaId>,
) -> String {
    if label != "array" {
        return label.to_string();
    }

    match &schema.items {
        Some(Items::Tuple(ids)) => {
            let types = ids
                .iter()
                .map(|item| schema_type_guarded(arena, *item, visiting))
                .collect::<Vec<_>>()
                .join(", ");
            let types = if types.is_empty() {
                UNKNOWN.to_string()
            } else {
                types
            };

            match schema.additional_items.map(|extra| (extra, arena.node(extra))) {
                None | Some((_, SchemaNode::Bool(true))) => {
                    format!("tuple<{}, ...optional<{}>>", types, ANY)
                }
                Some((_, SchemaNode::Bool(false))) => format!("tuple<{}>", types),
                Some((extra, _)) => format!(
                    "tuple<{}, ...optional<{}>>",
                    types,
                    schema_type_guarded(arena, extra, visiting)
                ),
            }
        }
        Some(Items::Single(item)) => {
            let item_type = schema_type_guarded(arena, *item, visiting);
            if item_type.is_empty() {
                format!("array<{}>", UNKNOWN)
            } else {
                format!("array<{}>", item_type)
            }
        }
        None => format!("array<{}>", ANY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn display(value: serde_json::Value) -> String {
        let (arena, root) = SchemaArena::from_json(&value);
        schema_type(&arena, root)
    }

    #[test]
    fn test_custom_types() {
        assert_eq!(display(json!(true)), "any");
        assert_eq!(display(json!(false)), "never");
        assert_eq!(display(json!({})), "any");
        assert_eq!(display(json!({ "not": {} })), "never");
        assert_eq!(display(json!({ "description": "free form" })), "any");
        assert_eq!(display(json!("not a schema")), "unknown");
    }

    #[test]
    fn test_explicit_types() {
        assert_eq!(display(json!({ "type": "string" })), "string");
        assert_eq!(display(json!({ "type": ["string", "null"] })), "string | null");
        assert_eq!(display(json!({ "type": ["integer", "number"] })), "number");
    }

    #[test]
    fn test_inferred_from_values() {
        assert_eq!(display(json!({ "const": 3 })), "integer");
        assert_eq!(display(json!({ "const": 2.5 })), "number");
        assert_eq!(display(json!({ "const": "on" })), "string");
        assert_eq!(display(json!({ "enum": [1, 2] })), "integer");
        assert_eq!(display(json!({ "enum": ["a", true] })), "string | boolean");
    }

    #[test]
    fn test_structural_keywords_without_type() {
        assert_eq!(display(json!({ "maxLength": 5 })), "");
        assert_eq!(display(json!({ "properties": { "a": {} } })), "");
    }

    #[test]
    fn test_array_types() {
        assert_eq!(display(json!({ "type": "array" })), "array<any>");
        assert_eq!(
            display(json!({ "type": "array", "items": { "type": "string" } })),
            "array<string>"
        );
        assert_eq!(
            display(json!({ "type": "array", "items": { "maxLength": 3 } })),
            "array<unknown>"
        );
    }

    #[test]
    fn test_tuple_types() {
        assert_eq!(
            display(json!({ "type": "array", "items": [{ "type": "string" }, { "type": "number" }] })),
            "tuple<string, number, ...optional<any>>"
        );
        assert_eq!(
            display(json!({
                "type": "array",
                "items": [{ "type": "string" }, { "type": "number" }],
                "additionalItems": false
            })),
            "tuple<string, number>"
        );
        assert_eq!(
            display(json!({
                "type": "array",
                "items": [{ "type": "string" }],
                "additionalItems": { "type": "boolean" }
            })),
            "tuple<string, ...optional<boolean>>"
        );
        assert_eq!(
            display(json!({ "type": "array", "items": [] })),
            "tuple<unknown, ...optional<any>>"
        );
    }

    #[test]
    fn test_combined_types() {
        assert_eq!(
            display(json!({ "type": "object", "oneOf": [{}, {}] })),
            "object oneOf"
        );
        assert_eq!(display(json!({ "anyOf": [{}, {}] })), "anyOf");
        assert_eq!(display(json!({ "oneOf": [{}], "anyOf": [{}] })), "any");
    }

    #[test]
    fn test_recursive_array_type_terminates() {
        assert_eq!(
            display(json!({ "type": "array", "items": { "$ref": "#" } })),
            "array<[CIRCULAR]>"
        );
    }
}
