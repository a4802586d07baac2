//! AsyncAPI Markdown - Markdown documentation from AsyncAPI documents.
//!
//! This library renders AsyncAPI 2.x and 3.x documents into Markdown. Its core is a
//! schema table engine that flattens nested, cyclic and polymorphic JSON Schemas
//! into six-column tables (Name, Type, Description, Value, Constraints, Notes).
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Recursively scans directories for YAML and JSON files
//! 2. [`parser`] - Loads a document file into a JSON value tree
//! 3. [`detector`] - Detects the AsyncAPI major version
//! 4. [`document`] - Typed views over the tree with `$ref` resolution ([`refs`])
//! 5. [`extractor`] - Normalizes 2.x and 3.x operations into one shape
//! 6. [`schema`] - Schema graph construction and table rendering
//! 7. [`sampler`] - Generated examples for schemas without explicit ones
//! 8. [`renderer`] - Assembles the Markdown document using [`markdown`] primitives
//! 9. [`output`] - Names and writes the generated files
//!
//! # Example Usage
//!
//! ```no_run
//! use asyncapi_markdown::{
//!     document::AsyncApiDocument,
//!     parser::DocumentParser,
//!     renderer::{render_document, RenderConfig},
//! };
//! use std::path::Path;
//!
//! let parsed = DocumentParser::parse_file(Path::new("asyncapi.yaml")).unwrap();
//! let document = AsyncApiDocument::from_parsed(parsed).unwrap();
//! let markdown = render_document(&document, &RenderConfig::default()).unwrap();
//! println!("{}", markdown);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod detector;
pub mod document;
pub mod refs;
pub mod extractor;
pub mod schema;
pub mod sampler;
pub mod markdown;
pub mod renderer;
pub mod output;
pub mod error;
