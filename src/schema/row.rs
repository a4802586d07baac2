use serde_json::Value;

use super::constraints::humanize_constraints;
use super::infer::{infer_type, schema_type, InferredType};
use super::path::display_name;
use super::{Items, ObjectSchema, RenderHints, SchemaArena, SchemaId, SchemaNode};
use crate::markdown::{escape_pipes, inline_code};

/// Column headers of a schema table
pub const HEADERS: [&str; 6] = ["Name", "Type", "Description", "Value", "Constraints", "Notes"];

/// Placeholder for empty cells
pub const EMPTY_CELL: &str = "-";

/// Name of the root row when the table has no other name for it
pub const ROOT_NAME: &str = "(root)";

/// One row of a schema table, cells unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRow {
    pub name: String,
    pub schema_type: String,
    pub description: String,
    pub value: String,
    pub constraints: String,
    pub notes: String,
}

impl SchemaRow {
    /// Cells ready for a pipe table: pipes escaped, empty cells as `-`
    pub fn cells(&self) -> [String; 6] {
        [
            &self.name,
            &self.schema_type,
            &self.description,
            &self.value,
            &self.constraints,
            &self.notes,
        ]
        .map(|cell| {
            if cell.is_empty() {
                EMPTY_CELL.to_string()
            } else {
                escape_pipes(cell)
            }
        })
    }

    /// `| name | type | ... |`
    pub fn to_markdown(&self) -> String {
        format!("| {} |", self.cells().join(" | "))
    }

    /// A root row that tells the reader nothing.
    ///
    /// Only a missing, `object` or `array` type counts as uninformative; every other
    /// cell apart from the name has to be empty too.
    pub fn is_uninformative(&self) -> bool {
        matches!(self.schema_type.as_str(), "" | "object" | "array")
            && self.description.is_empty()
            && self.value.is_empty()
            && self.constraints.is_empty()
            && self.notes.is_empty()
    }
}

/// Where a node sits in the table.
#[derive(Debug, Clone, Default)]
pub struct RowContext<'a> {
    /// Dotted path of the node
    pub path: &'a str,
    /// Name used when the path is empty
    pub fallback_name: &'a str,
    /// Parenthesized suffix of the name, e.g. `single item`
    pub note: Option<&'a str>,
    pub required: bool,
    /// Properties whose presence makes this one required
    pub dependent_required: &'a [String],
    pub circular: bool,
    /// Cleared below `not`, `if` and friends
    pub allow_additional_info: bool,
    /// Replaces the node's own description
    pub description: Option<&'a str>,
}

/// Build the row describing one node.
pub fn build_row(arena: &SchemaArena, id: SchemaId, context: &RowContext<'_>) -> SchemaRow {
    let hints = arena.hints(id);
    let schema = arena.object(id);

    let schema_type = if hints.render_type {
        schema_type(arena, id)
    } else {
        String::new()
    };

    let description = match (context.description.filter(|text| !text.is_empty()), schema) {
        (Some(text), Some(schema)) => with_external_docs(&collapse_newlines(text), schema),
        (Some(text), None) => collapse_newlines(text),
        (None, Some(schema)) => describe(schema),
        (None, None) => String::new(),
    };

    let mut notes = Vec::new();
    if schema.map(|s| s.deprecated).unwrap_or(false) {
        notes.push("**deprecated**".to_string());
    }
    if context.required {
        notes.push("**required**".to_string());
    }
    if !context.dependent_required.is_empty() {
        let names: Vec<String> = context
            .dependent_required
            .iter()
            .map(|name| inline_code(name))
            .collect();
        notes.push(format!("**required when defined ({})**", names.join(", ")));
    }
    if let Some(location) = &hints.parameter_location {
        notes.push(format!("**parameter location ({})**", location));
    }
    if context.circular {
        notes.push("**[CIRCULAR]**".to_string());
    }
    if let Some(schema) = schema {
        if schema.write_only {
            notes.push("**write-only**".to_string());
        }
        if schema.read_only {
            notes.push("**read-only**".to_string());
        }
        if context.allow_additional_info && hints.render_additional_info {
            let inferred = infer_type(arena, id);
            notes.extend(additional_properties_note(arena, schema, &inferred));
            notes.extend(additional_items_note(arena, schema, &inferred));
        }
    }

    SchemaRow {
        name: display_name(context.path, context.fallback_name, context.note),
        schema_type,
        description,
        value: schema.map(|s| value_cell(s, &hints)).unwrap_or_default(),
        constraints: schema.map(constraints_cell).unwrap_or_default(),
        notes: notes.join(", "),
    }
}

/// Description with collapsed newlines and the external documentation link.
fn describe(schema: &ObjectSchema) -> String {
    let description = collapse_newlines(schema.description.as_deref().unwrap_or_default());
    with_external_docs(&description, schema)
}

fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ").trim().to_string()
}

fn with_external_docs(description: &str, schema: &ObjectSchema) -> String {
    let docs = match &schema.external_docs {
        Some(docs) => docs,
        None => return description.to_string(),
    };
    let label = docs
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or("Documentation");
    let link = format!("[{}]({})", label, docs.url);

    if description.is_empty() {
        link
    } else if description.ends_with('.') {
        format!("{} {}", description, link)
    } else {
        format!("{}. {}", description, link)
    }
}

/// Readable form of a literal value: strings quoted, arrays bracketed, the rest as JSON.
pub fn prettify_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{}\"", text),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

fn value_cell(schema: &ObjectSchema, hints: &RenderHints) -> String {
    if hints.raw_value {
        return schema
            .const_value
            .as_ref()
            .map(|value| inline_code(&prettify_value(value)))
            .unwrap_or_default();
    }

    let listed = |values: &[Value]| -> String {
        values
            .iter()
            .map(|value| inline_code(&prettify_value(value)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut parts = Vec::new();
    if let Some(default) = &schema.default {
        parts.push(format!("default ({})", inline_code(&prettify_value(default))));
    }
    if let Some(constant) = &schema.const_value {
        parts.push(format!("const ({})", inline_code(&prettify_value(constant))));
    }
    if let Some(values) = schema.enum_values.as_deref().filter(|v| !v.is_empty()) {
        parts.push(format!("allowed ({})", listed(values)));
    }
    if let Some(values) = schema.examples.as_deref().filter(|v| !v.is_empty()) {
        parts.push(format!("examples ({})", listed(values)));
    }
    parts.join(", ")
}

fn constraints_cell(schema: &ObjectSchema) -> String {
    let mut parts = Vec::new();
    let labelled = [
        ("format", &schema.format),
        ("pattern", &schema.pattern),
        ("media type", &schema.content_media_type),
        ("encoding", &schema.content_encoding),
    ];
    for (label, value) in labelled {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            parts.push(format!("{} ({})", label, inline_code(value)));
        }
    }
    parts.extend(humanize_constraints(schema));
    parts.join(", ")
}

fn additional_properties_note(
    arena: &SchemaArena,
    schema: &ObjectSchema,
    inferred: &InferredType,
) -> Option<String> {
    if !(inferred.includes("object") || *inferred == InferredType::Empty) {
        return None;
    }

    match schema.additional_properties.map(|id| arena.node(id)) {
        None | Some(SchemaNode::Bool(true)) => {
            Some("**additional properties are allowed**".to_string())
        }
        Some(SchemaNode::Bool(false)) => {
            Some("**additional properties are NOT allowed**".to_string())
        }
        Some(_) => None,
    }
}

fn additional_items_note(
    arena: &SchemaArena,
    schema: &ObjectSchema,
    inferred: &InferredType,
) -> Option<String> {
    let array_like = inferred.includes("array") || *inferred == InferredType::Empty;
    if !array_like || !matches!(schema.items, Some(Items::Tuple(_))) {
        return None;
    }

    match schema.additional_items.map(|id| arena.node(id)) {
        None | Some(SchemaNode::Bool(true)) => Some("**additional items are allowed**".to_string()),
        Some(SchemaNode::Bool(false)) => Some("**additional items are NOT allowed**".to_string()),
        Some(_) => None,
    }
}
