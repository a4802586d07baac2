//! Generated example values for schemas without explicit examples.

use serde_json::{json, Map, Value};

use crate::schema::circular::AncestorStack;
use crate::schema::infer::{infer_type, InferredType};
use crate::schema::{Items, ObjectSchema, SchemaArena, SchemaId, SchemaNode};

/// Produce an example value conforming (loosely) to a schema.
///
/// Explicit values win in this order: `const`, first of `examples`, `default`,
/// first of `enum`. Otherwise a value is derived from the type. Recursive
/// schemas stop with `{}` where they re-enter themselves.
pub fn sample(arena: &SchemaArena, id: SchemaId) -> Value {
    let mut ancestors = AncestorStack::new();
    sample_node(arena, id, &mut ancestors)
}

fn sample_node(arena: &SchemaArena, id: SchemaId, ancestors: &mut AncestorStack) -> Value {
    if ancestors.is_circular(id) {
        return json!({});
    }

    let schema = match arena.node(id) {
        SchemaNode::Object(schema) => schema,
        SchemaNode::Bool(_) | SchemaNode::Unresolved(_) => return Value::Null,
    };

    if let Some(value) = explicit_value(schema) {
        return value;
    }

    ancestors.push(id);
    let value = sample_object_schema(arena, id, schema, ancestors);
    ancestors.pop();
    value
}

fn explicit_value(schema: &ObjectSchema) -> Option<Value> {
    schema
        .const_value
        .clone()
        .or_else(|| schema.examples.as_ref().and_then(|list| list.first().cloned()))
        .or_else(|| schema.default.clone())
        .or_else(|| {
            schema
                .enum_values
                .as_ref()
                .and_then(|list| list.first().cloned())
        })
}

fn sample_object_schema(
    arena: &SchemaArena,
    id: SchemaId,
    schema: &ObjectSchema,
    ancestors: &mut AncestorStack,
) -> Value {
    if let Some(members) = &schema.all_of {
        let mut merged = Map::new();
        for member in members {
            match sample_node(arena, *member, ancestors) {
                Value::Object(entries) => merged.extend(entries),
                other if merged.is_empty() && members.len() == 1 => return other,
                _ => {}
            }
        }
        if let Value::Object(own) = sample_properties(arena, schema, ancestors) {
            merged.extend(own);
        }
        return Value::Object(merged);
    }

    if let Some(first) = schema
        .one_of
        .as_ref()
        .or(schema.any_of.as_ref())
        .and_then(|members| members.first())
    {
        return sample_node(arena, *first, ancestors);
    }

    let label = match infer_type(arena, id) {
        InferredType::Single(label) => label,
        InferredType::Multiple(labels) => labels
            .into_iter()
            .find(|label| label != "null")
            .unwrap_or_else(|| "null".to_string()),
        InferredType::Empty if schema.implies_object() => "object".to_string(),
        InferredType::Empty if schema.implies_array() => "array".to_string(),
        InferredType::Empty => String::new(),
    };

    match label.as_str() {
        "object" => sample_properties(arena, schema, ancestors),
        "array" => match &schema.items {
            Some(Items::Single(item)) => Value::Array(vec![sample_node(arena, *item, ancestors)]),
            Some(Items::Tuple(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| sample_node(arena, *item, ancestors))
                    .collect(),
            ),
            None => json!([]),
        },
        "string" => json!(sample_string(schema.format.as_deref())),
        "integer" => schema
            .minimum
            .or(schema.exclusive_minimum.map(|bound| bound.floor() + 1.0))
            .map(|bound| json!(bound as i64))
            .unwrap_or_else(|| json!(0)),
        "number" => schema
            .minimum
            .or(schema.exclusive_minimum)
            .map(|bound| json!(bound))
            .unwrap_or_else(|| json!(0)),
        "boolean" => json!(true),
        _ => Value::Null,
    }
}

fn sample_properties(
    arena: &SchemaArena,
    schema: &ObjectSchema,
    ancestors: &mut AncestorStack,
) -> Value {
    let entries = schema
        .properties
        .iter()
        .map(|(name, property)| (name.clone(), sample_node(arena, *property, ancestors)))
        .collect();
    Value::Object(entries)
}

fn sample_string(format: Option<&str>) -> &'static str {
    match format {
        Some("date-time") => "2019-08-24T14:15:22Z",
        Some("date") => "2019-08-24",
        Some("time") => "14:15:22Z",
        Some("email") => "user@example.com",
        Some("uri") | Some("url") => "http://example.com",
        Some("uuid") => "095be615-a8ad-4c33-8e9c-c7612fbf6c9f",
        Some("hostname") => "example.com",
        Some("ipv4") => "192.168.0.1",
        _ => "string",
    }
}
