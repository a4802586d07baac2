//! Schemas synthesized from data that is not a schema itself: binding objects,
//! vendor extensions and channel parameters.

use serde_json::{json, Value};

use super::builder::SchemaBuilder;
use super::infer::{value_type, JSON_SCHEMA_TYPES};
use super::{Items, ObjectSchema, RenderHints, SchemaId, SchemaNode, TypeKeyword};
use crate::refs::reference_of;

/// A channel parameter to be shown as a property of the parameters table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub name: String,
    pub description: Option<String>,
    /// Schema of the parameter value; a missing schema accepts anything
    pub schema: Option<Value>,
    /// Runtime expression telling where the value comes from
    pub location: Option<String>,
}

/// Whether a raw JSON value is already written as a schema.
///
/// Only objects whose `type` names JSON types qualify; everything else is
/// treated as plain data.
pub fn is_json_schema(value: &Value) -> bool {
    match value.get("type") {
        Some(Value::String(label)) => JSON_SCHEMA_TYPES.contains(&label.as_str()),
        Some(Value::Array(labels)) => {
            !labels.is_empty()
                && labels.iter().all(|label| {
                    label
                        .as_str()
                        .map(|label| JSON_SCHEMA_TYPES.contains(&label))
                        .unwrap_or(false)
                })
        }
        _ => false,
    }
}

impl SchemaBuilder<'_> {
    /// Describe an arbitrary JSON value as a schema.
    ///
    /// Objects and arrays become untyped containers, literals become raw value leaves
    /// and embedded schemas (or `$ref`s) are built as regular schemas.
    pub fn json_to_schema(&mut self, value: &Value) -> SchemaId {
        if value.is_object() && (is_json_schema(value) || reference_of(value).is_some()) {
            return self.build(value);
        }

        match value {
            Value::Array(items) => {
                let items = items.iter().map(|item| self.json_to_schema(item)).collect();
                let schema = ObjectSchema {
                    schema_type: Some(TypeKeyword::Single("array".to_string())),
                    items: Some(Items::Tuple(items)),
                    ..ObjectSchema::default()
                };
                self.arena
                    .alloc_object(schema, RenderHints::synthetic_container())
            }
            Value::Object(entries) => {
                let properties = entries
                    .iter()
                    .map(|(key, entry)| (key.clone(), self.json_to_schema(entry)))
                    .collect();
                let schema = ObjectSchema {
                    schema_type: Some(TypeKeyword::Single("object".to_string())),
                    properties,
                    ..ObjectSchema::default()
                };
                self.arena
                    .alloc_object(schema, RenderHints::synthetic_container())
            }
            literal => {
                let schema = ObjectSchema {
                    schema_type: Some(TypeKeyword::Single(value_type(literal).to_string())),
                    const_value: Some(literal.clone()),
                    ..ObjectSchema::default()
                };
                self.arena.alloc_object(schema, RenderHints::raw_value())
            }
        }
    }

    /// Combine channel parameters into one object schema whose properties are the
    /// parameters, all of them required.
    ///
    /// Returns `None` when there are no parameters.
    pub fn parameters_to_schema(&mut self, parameters: &[ParameterSchema]) -> Option<SchemaId> {
        if parameters.is_empty() {
            return None;
        }

        let mut schema = ObjectSchema {
            schema_type: Some(TypeKeyword::Single("object".to_string())),
            ..ObjectSchema::default()
        };

        for parameter in parameters {
            let base = match &parameter.schema {
                Some(value) => self.build(value),
                None => self.build(&json!({})),
            };
            let id = self.parameter_node(base, parameter);
            schema.properties.insert(parameter.name.clone(), id);
            schema.required.push(parameter.name.clone());
        }

        Some(
            self.arena
                .alloc_object(schema, RenderHints::synthetic_container()),
        )
    }

    /// Copy of the parameter's schema node carrying its description and location.
    ///
    /// The copy keeps the children of the original, so references below it still
    /// point into the shared graph.
    fn parameter_node(&mut self, base: SchemaId, parameter: &ParameterSchema) -> SchemaId {
        let description = parameter
            .description
            .as_ref()
            .filter(|text| !text.is_empty())
            .cloned();

        let node = match self.arena.node(base).clone() {
            SchemaNode::Object(mut schema) => {
                if description.is_some() {
                    schema.description = description;
                }
                SchemaNode::Object(schema)
            }
            SchemaNode::Bool(true) => SchemaNode::Object(Box::new(ObjectSchema {
                description,
                ..ObjectSchema::default()
            })),
            other => other,
        };

        let id = self.arena.alloc(node);
        let mut hints = self.arena.hints(base);
        hints.parameter_location = parameter.location.clone();
        self.arena.set_hints(id, hints);
        if let Some(extensions) = self.arena.extension_schema(base) {
            self.arena.set_extension_schema(id, extensions);
        }
        id
    }
}
