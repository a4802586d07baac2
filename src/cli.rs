use crate::document::AsyncApiDocument;
use crate::output::{scanned_output_path, write_to_file, DEFAULT_OUT_FILENAME};
use crate::parser::{DocumentParser, ParsedDocument};
use crate::renderer::{render_document, FrontMatter, RenderConfig};
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// AsyncAPI Markdown - Render AsyncAPI 2.x/3.x documents as Markdown documentation
#[derive(Parser, Debug)]
#[command(name = "asyncapi-markdown")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// AsyncAPI document, or a directory to search for documents
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory (if not specified, a single document is printed to stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the generated file for a single document
    #[arg(long = "out-filename", value_name = "NAME", default_value = DEFAULT_OUT_FILENAME)]
    pub out_filename: String,

    /// Do not render the table of contents
    #[arg(long = "no-toc")]
    pub no_toc: bool,

    /// YAML file whose content is emitted as front matter
    #[arg(long = "front-matter", value_name = "FILE", conflicts_with = "front_matter_default")]
    pub front_matter: Option<PathBuf>,

    /// Emit the default Slate front matter
    #[arg(long = "front-matter-default")]
    pub front_matter_default: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Rendering options selected on the command line
    pub fn render_config(&self) -> RenderConfig {
        let front_matter = match (&self.front_matter, self.front_matter_default) {
            (Some(path), _) => FrontMatter::File(path.clone()),
            (None, true) => FrontMatter::Default,
            (None, false) => FrontMatter::None,
        };
        RenderConfig {
            toc: !self.no_toc,
            front_matter,
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    if args.input.is_dir() && args.output_dir.is_none() {
        anyhow::bail!(
            "Input path is a directory, please specify an output directory with --output: {}",
            args.input.display()
        );
    }

    if args.out_filename.trim().is_empty() {
        anyhow::bail!("Output file name must not be empty");
    }

    if let Some(ref front_matter) = args.front_matter {
        if !front_matter.is_file() {
            anyhow::bail!("Front matter file does not exist: {}", front_matter.display());
        }
    }

    info!("Input: {}", args.input.display());
    if let Some(ref output) = args.output_dir {
        info!("Output directory: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if args.no_toc {
        info!("Table of contents: disabled");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let config = args.render_config();

    if args.input.is_dir() {
        return run_directory(&args, &config);
    }

    info!("Rendering {}", args.input.display());
    let parsed = DocumentParser::parse_file(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let markdown = render_parsed(parsed, &config)?;

    match &args.output_dir {
        Some(output_dir) => {
            let path = output_dir.join(&args.out_filename);
            write_to_file(&markdown, &path)?;
            info!("Successfully wrote Markdown to {}", path.display());
        }
        None => print!("{}", markdown),
    }
    Ok(())
}

fn run_directory(args: &CliArgs, config: &RenderConfig) -> Result<()> {
    let Some(output_dir) = &args.output_dir else {
        anyhow::bail!("An output directory is required for directory input");
    };

    info!("Scanning {} for AsyncAPI documents...", args.input.display());
    let scan_result = FileScanner::new(args.input.clone()).scan()?;
    info!("Found {} candidate files", scan_result.document_files.len());

    if scan_result.document_files.is_empty() {
        anyhow::bail!("No YAML or JSON files found in {}", args.input.display());
    }

    let mut rendered = 0;
    for result in DocumentParser::parse_files(&scan_result.document_files) {
        let Ok(parsed) = result else { continue };
        let source = parsed.path.clone();

        let document = match AsyncApiDocument::from_parsed(parsed) {
            Ok(document) => document,
            Err(e) => {
                debug!("Skipping {}: {}", source.display(), e);
                continue;
            }
        };

        match render_document(&document, config) {
            Ok(markdown) => {
                let path = scanned_output_path(output_dir, &source);
                write_to_file(&markdown, &path)?;
                info!("Rendered {} -> {}", source.display(), path.display());
                rendered += 1;
            }
            Err(e) => warn!("Failed to render {}: {}", source.display(), e),
        }
    }

    if rendered == 0 {
        anyhow::bail!("No AsyncAPI documents found in {}", args.input.display());
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.document_files.len());
    info!("  - Documents rendered: {}", rendered);
    Ok(())
}

fn render_parsed(parsed: ParsedDocument, config: &RenderConfig) -> Result<String> {
    let path = parsed.path.clone();
    let document = AsyncApiDocument::from_parsed(parsed)
        .with_context(|| format!("Not an AsyncAPI document: {}", path.display()))?;
    info!("Detected AsyncAPI {:?} document", document.version());
    render_document(&document, config)
        .with_context(|| format!("Failed to render {}", path.display()))
}
