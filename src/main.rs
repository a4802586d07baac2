//! AsyncAPI Markdown - Command-line tool for rendering AsyncAPI documents as Markdown.
//!
//! This binary reads an AsyncAPI 2.x or 3.x document (YAML or JSON) and writes
//! Markdown documentation: info, table of contents, servers with their security
//! requirements, and every operation with its messages, rendered as schema tables.
//!
//! # Usage
//!
//! ```bash
//! asyncapi-markdown [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Print the documentation of one document:
//! ```bash
//! asyncapi-markdown ./asyncapi.yaml
//! ```
//!
//! Render every document of a directory into `docs/`:
//! ```bash
//! asyncapi-markdown ./specs -o docs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! asyncapi-markdown ./asyncapi.yaml -v
//! ```

use anyhow::Result;
use asyncapi_markdown::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists, validate afterwards
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("AsyncAPI Markdown starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Markdown generation completed successfully");

    Ok(())
}
