use log::debug;

use super::circular::AncestorStack;
use super::path::{build_path, display_name};
use super::row::{build_row, RowContext, SchemaRow, HEADERS, ROOT_NAME};
use super::{Dependency, Items, ObjectSchema, SchemaArena, SchemaId};
use crate::markdown::{header, table_head};

/// Per-table configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTableOptions {
    /// Title of the table
    pub schema_name: Option<String>,
    /// Leave out the `####` title line
    pub hide_title: bool,
    /// Replaces the root node's description
    pub description: Option<String>,
}

impl SchemaTableOptions {
    /// Titled table
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            schema_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Table without a title line
    pub fn untitled() -> Self {
        Self {
            hide_title: true,
            ..Self::default()
        }
    }
}

/// Render a schema graph as an ordered list of rows.
///
/// The root row is left out when it carries no information; its children are
/// still listed.
pub fn render_schema(
    arena: &SchemaArena,
    root: SchemaId,
    description: Option<&str>,
) -> Vec<SchemaRow> {
    let mut traversal = Traversal {
        arena,
        ancestors: AncestorStack::new(),
        rows: Vec::new(),
    };
    traversal.visit(
        root,
        Visit {
            is_root: true,
            description,
            ..Visit::default()
        },
    );
    traversal.rows
}

/// Render a schema as a complete Markdown table, optionally preceded by a
/// `####` title.
pub fn render_schema_table(
    arena: &SchemaArena,
    root: SchemaId,
    options: &SchemaTableOptions,
) -> String {
    let rows = render_schema(arena, root, options.description.as_deref());

    let mut out = String::new();
    if !options.hide_title {
        if let Some(name) = options.schema_name.as_deref().filter(|n| !n.is_empty()) {
            out.push_str(&header(4, name));
        }
    }
    out.push_str(&table_head(&HEADERS));
    for row in &rows {
        out.push_str(&row.to_markdown());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Default)]
struct Visit<'a> {
    path: String,
    note: Option<&'static str>,
    required: bool,
    dependent_required: Vec<String>,
    restrict_additional_info: bool,
    is_root: bool,
    description: Option<&'a str>,
}

impl Visit<'_> {
    fn child(path: String, note: Option<&'static str>) -> Self {
        Self {
            path,
            note,
            ..Self::default()
        }
    }

    fn restricted(path: String, note: &'static str) -> Self {
        Self {
            path,
            note: Some(note),
            restrict_additional_info: true,
            ..Self::default()
        }
    }
}

struct Traversal<'a> {
    arena: &'a SchemaArena,
    ancestors: AncestorStack,
    rows: Vec<SchemaRow>,
}

impl<'a> Traversal<'a> {
    fn visit(&mut self, id: SchemaId, visit: Visit<'_>) {
        let circular = self.ancestors.is_circular(id);
        let context = RowContext {
            path: &visit.path,
            fallback_name: if visit.is_root { ROOT_NAME } else { "" },
            note: visit.note,
            required: visit.required,
            dependent_required: &visit.dependent_required,
            circular,
            allow_additional_info: !visit.restrict_additional_info,
            description: visit.description,
        };
        let row = build_row(self.arena, id, &context);

        if visit.is_root && row.is_uninformative() {
            debug!("Skipping uninformative root row");
        } else {
            self.rows.push(row);
        }

        if circular {
            debug!(
                "Circular schema reached at '{}' (depth {})",
                visit.path,
                self.ancestors.depth()
            );
            return;
        }

        let arena = self.arena;
        let schema = match arena.object(id) {
            Some(schema) => schema,
            None => return,
        };

        self.ancestors.push(id);
        self.visit_children(id, schema, &visit.path);
        self.ancestors.pop();
    }

    fn visit_children(&mut self, id: SchemaId, schema: &ObjectSchema, path: &str) {
        let arena = self.arena;

        for (name, property) in &schema.properties {
            self.visit(
                *property,
                Visit {
                    path: build_path(path, name),
                    required: schema.required.contains(name),
                    dependent_required: dependent_required(name, schema),
                    ..Visit::default()
                },
            );
        }

        for (pattern, property) in &schema.pattern_properties {
            self.visit(
                *property,
                Visit::child(build_path(path, pattern), Some("pattern property")),
            );
        }

        match &schema.items {
            Some(Items::Single(item)) => {
                self.visit(*item, Visit::child(path.to_string(), Some("single item")));
            }
            Some(Items::Tuple(items)) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(
                        *item,
                        Visit::child(build_path(path, &index.to_string()), Some("index")),
                    );
                }
            }
            None => {}
        }

        let expand_additional = arena.hints(id).render_additional_info;
        if let Some(additional) = schema.additional_properties {
            if expand_additional && arena.object(additional).is_some() {
                self.visit(
                    additional,
                    Visit::child(path.to_string(), Some("additional properties")),
                );
            }
        }
        if let (Some(additional), Some(Items::Tuple(_))) = (schema.additional_items, &schema.items) {
            if expand_additional && arena.object(additional).is_some() {
                self.visit(
                    additional,
                    Visit::child(path.to_string(), Some("additional items")),
                );
            }
        }

        let combinators = [
            (&schema.one_of, "oneOf item"),
            (&schema.any_of, "anyOf item"),
            (&schema.all_of, "allOf item"),
        ];
        for (members, note) in combinators {
            for (index, member) in members.iter().flatten().enumerate() {
                self.visit(
                    *member,
                    Visit::child(build_path(path, &index.to_string()), Some(note)),
                );
            }
        }

        let singles = [
            (schema.not, "not"),
            (schema.property_names, "property names"),
            (schema.contains, "contains"),
            (schema.if_schema, "if"),
            (schema.then_schema, "then"),
            (schema.else_schema, "else"),
        ];
        for (child, note) in singles {
            if let Some(child) = child {
                self.visit(child, Visit::restricted(path.to_string(), note));
            }
        }

        self.visit_dependent_schemas(schema, path);

        if let Some(extensions) = arena.extension_schema(id) {
            if let Some(synthetic) = arena.object(extensions) {
                for (name, value) in &synthetic.properties {
                    self.visit(*value, Visit::child(build_path(path, name), None));
                }
            }
        }
    }

    /// Schemas from `dependencies`/`dependentSchemas` under one group row.
    fn visit_dependent_schemas(&mut self, schema: &ObjectSchema, path: &str) {
        let dependents: Vec<(&String, SchemaId)> = schema
            .dependencies
            .iter()
            .filter_map(|(name, dependency)| match dependency {
                Dependency::Schema(id) => Some((name, *id)),
                Dependency::Required(_) => None,
            })
            .collect();
        if dependents.is_empty() {
            return;
        }

        self.rows.push(SchemaRow {
            name: display_name(path, "", Some("dependency schemas")),
            ..SchemaRow::default()
        });
        for (name, dependent) in dependents {
            self.visit(dependent, Visit::child(build_path(path, name), None));
        }
    }
}

/// Properties whose presence requires `property`, taken from the dependency arrays.
pub fn dependent_required(property: &str, schema: &ObjectSchema) -> Vec<String> {
    schema
        .dependencies
        .iter()
        .filter_map(|(name, dependency)| match dependency {
            Dependency::Required(required) if required.iter().any(|r| r == property) => {
                Some(name.clone())
            }
            _ => None,
        })
        .collect()
}
