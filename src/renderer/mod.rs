//! Markdown rendering of a whole AsyncAPI document.
//!
//! The output is assembled section by section:
//!
//! 1. front matter (optional)
//! 2. [`info`] - title, contact and license list, description, tags
//! 3. [`toc`] - table of contents (optional)
//! 4. [`servers`] - servers with URL variables, [`security`] requirements, bindings
//! 5. [`operations`] - operations with parameters, [`message`]s and replies
//!
//! All schema tables of one document share a single [`SchemaArena`], so a schema
//! referenced from several messages is built once.

pub mod common;
pub mod info;
pub mod message;
pub mod operations;
pub mod security;
pub mod servers;
pub mod toc;

use crate::document::AsyncApiDocument;
use crate::error::{Error, Result};
use crate::extractor::extractor_for;
use crate::schema::{render_schema_table, SchemaArena, SchemaBuilder, SchemaId, SchemaTableOptions};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Front matter emitted before the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FrontMatter {
    #[default]
    None,
    /// Slate-style defaults derived from the document title
    Default,
    /// Contents of a YAML file
    File(PathBuf),
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Emit the table of contents
    pub toc: bool,
    pub front_matter: FrontMatter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            toc: true,
            front_matter: FrontMatter::None,
        }
    }
}

#[derive(Serialize)]
struct DefaultFrontMatter<'a> {
    title: &'a str,
    language_tabs: Vec<String>,
    toc_footers: Vec<String>,
    includes: Vec<String>,
    search: bool,
    code_clipboard: bool,
}

/// Renders one document into Markdown.
///
/// The renderer owns the schema arena for the document and the counter naming
/// anonymous messages, so it is meant to be used once per document.
pub struct DocumentRenderer<'a> {
    document: &'a AsyncApiDocument,
    config: &'a RenderConfig,
    arena: SchemaArena,
    anonymous_messages: usize,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(document: &'a AsyncApiDocument, config: &'a RenderConfig) -> Self {
        Self {
            document,
            config,
            arena: SchemaArena::new(),
            anonymous_messages: 0,
        }
    }

    /// Renders the complete document.
    ///
    /// # Errors
    ///
    /// Returns an error when the front matter file cannot be read, or when a
    /// top-level section (info, servers) does not have the expected shape.
    pub fn render(mut self) -> Result<String> {
        let operations = extractor_for(self.document.version()).extract_operations(self.document);
        debug!("Rendering document with {} operations", operations.len());

        let mut out = String::new();
        out.push_str(&self.render_front_matter()?);
        out.push_str(&self.render_info()?);
        if self.config.toc {
            out.push_str(&self.render_toc(&operations)?);
        }
        out.push_str(&self.render_servers()?);
        out.push_str(&self.render_operations(&operations));

        let mut rendered = out.trim().to_string();
        rendered.push('\n');
        Ok(rendered)
    }

    fn render_front_matter(&self) -> Result<String> {
        let yaml = match &self.config.front_matter {
            FrontMatter::None => return Ok(String::new()),
            FrontMatter::Default => {
                let info = self.document.info()?;
                serde_yaml::to_string(&DefaultFrontMatter {
                    title: &info.title,
                    language_tabs: Vec::new(),
                    toc_footers: Vec::new(),
                    includes: Vec::new(),
                    search: true,
                    code_clipboard: true,
                })?
            }
            FrontMatter::File(path) => {
                debug!("Reading front matter from {}", path.display());
                let content = fs::read_to_string(path)?;
                let front_matter: serde_yaml::Value = serde_yaml::from_str(&content)?;
                if !front_matter.is_mapping() {
                    return Err(Error::InvalidArgument(format!(
                        "front matter must be a YAML mapping: {}",
                        path.display()
                    )));
                }
                serde_yaml::to_string(&front_matter)?
            }
        };
        Ok(format!("---\n{}\n---\n\n", yaml.trim_end()))
    }

    fn builder(&mut self) -> SchemaBuilder<'_> {
        SchemaBuilder::new(&mut self.arena, self.document.root())
    }

    /// Titled table describing arbitrary JSON (bindings, extensions).
    fn json_table(&mut self, name: &str, value: &Value) -> String {
        let id = self.builder().json_to_schema(value);
        self.table_for(id, &SchemaTableOptions::named(name))
    }

    fn table_for(&self, id: SchemaId, options: &SchemaTableOptions) -> String {
        format!("{}\n", render_schema_table(&self.arena, id, options))
    }

    fn next_anonymous_message(&mut self) -> String {
        self.anonymous_messages += 1;
        format!("<anonymous-message-{}>", self.anonymous_messages)
    }
}

/// Renders a document with the given configuration.
///
/// # Example
///
/// ```
/// use asyncapi_markdown::document::AsyncApiDocument;
/// use asyncapi_markdown::renderer::{render_document, RenderConfig};
/// use serde_json::json;
///
/// let document = AsyncApiDocument::new(json!({
///     "asyncapi": "2.6.0",
///     "info": { "title": "Streetlights API", "version": "1.0.0" }
/// }))
/// .unwrap();
/// let markdown = render_document(&document, &RenderConfig::default()).unwrap();
/// assert!(markdown.starts_with("# Streetlights API 1.0.0 documentation"));
/// ```
///
/// # Errors
///
/// See [`DocumentRenderer::render`].
pub fn render_document(document: &AsyncApiDocument, config: &RenderConfig) -> Result<String> {
    DocumentRenderer::new(document, config).render()
}

/// Appends a newline until the text ends with a blank line.
pub(crate) fn end_block(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}
