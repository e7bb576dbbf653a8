//! iiif-ingest: IIIF Presentation manifest ingestion.
//!
//! Loads IIIF Presentation 2.0 and 3.0 manifests, converts legacy documents
//! into the 3.0 shape, resolves externally referenced annotation pages and
//! projects the result into flat, display-ready records: canvases with their
//! painted media and thumbnails, decoded annotations, annotation sets,
//! languages and the table of contents.
//!
//! # Modules
//!
//! - [`loader`]: The ingestion pipeline ([`ManifestLoader`])
//! - [`manifest`]: Manifest-level projection ([`ManifestParser`])
//! - [`annotation`]: Annotation body, target and title decoding
//! - [`resource`]: Borrowed parsers over resource nodes and the [`Resource`] factory
//! - [`template`]: Annotation templates and the [`TemplateRegistry`]
//! - [`upgrade`]: Presentation 2.0 to 3.0 conversion
//! - [`validation`]: Version detection, root checks and manifest linting
//! - [`error`]: Error types for iiif-ingest operations

pub mod annotation;
pub mod error;
pub mod fetch;
pub mod html;
pub mod inspect;
pub mod languages;
pub mod loader;
pub mod manifest;
pub mod model;
pub mod resource;
pub mod template;
pub mod upgrade;
pub mod validation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

pub use error::IiifError;
pub use fetch::{FetchConfig, HttpFetcher, JsonFetcher, StaticFetcher};
pub use loader::{LoaderStatus, ManifestLoader, ManifestSource};
pub use manifest::ManifestParser;
pub use resource::Resource;
pub use template::{Template, TemplateRegistry};

/// The iiif-ingest CLI application.
#[derive(Parser)]
#[command(name = "iiif-ingest")]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Timeout per HTTP request, in seconds (0 disables the timeout).
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load a manifest and lint its structure.
    Validate(ValidateArgs),
    /// Load a manifest and print its projection.
    Inspect(InspectArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Manifest URL or local JSON file.
    manifest: String,

    /// Treat lint warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Manifest URL or local JSON file.
    manifest: String,

    /// Preferred language code for labels.
    #[arg(long)]
    lang: Option<String>,

    /// Annotation template URL to load before parsing (repeatable).
    #[arg(long = "template")]
    templates: Vec<String>,

    /// Annotation template JSON file to load before parsing (repeatable).
    #[arg(long = "template-file")]
    template_files: Vec<PathBuf>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the iiif-ingest CLI with parsed arguments.
///
/// This is the main entry point for the CLI, called from `main.rs` once
/// logging is set up.
pub fn run(cli: Cli) -> Result<(), IiifError> {
    let config = FetchConfig {
        timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
        ..FetchConfig::default()
    };
    let fetcher = HttpFetcher::new(&config);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args, &fetcher),
        Some(Commands::Inspect(args)) => run_inspect(args, &fetcher),
        None => {
            println!("iiif-ingest {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("IIIF Presentation manifest ingestion.");
            println!();
            println!("Run 'iiif-ingest --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs, fetcher: &dyn JsonFetcher) -> Result<(), IiifError> {
    check_output_format(&args.output)?;
    let loader = load_manifest(&args.manifest, fetcher)?;
    let version = loader.version().map(|v| v.to_string()).unwrap_or_default();

    let Some(Resource::Manifest(manifest)) = loader.parser() else {
        let members = loader
            .parser()
            .and_then(|root| root.as_collection().map(|c| c.items().len()))
            .unwrap_or_default();
        match args.output.as_str() {
            "json" => print_json(&json!({
                "version": version,
                "type": "Collection",
                "members": members
            }))?,
            _ => println!("Collection loaded (Presentation {version}) with {members} member(s)"),
        }
        return Ok(());
    };

    let report = validation::lint_manifest(manifest.data());
    match args.output.as_str() {
        "json" => print_json(&json!({
            "version": version,
            "type": "Manifest",
            "errorCount": report.error_count(),
            "warningCount": report.warning_count(),
            "issues": report.issues
        }))?,
        _ => {
            println!("Manifest loaded (Presentation {version})");
            print!("{}", report);
        }
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;
    if has_errors || (args.strict && has_warnings) {
        Err(IiifError::LintFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
        })
    } else {
        Ok(())
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs, fetcher: &dyn JsonFetcher) -> Result<(), IiifError> {
    check_output_format(&args.output)?;

    let mut templates = TemplateRegistry::new();
    for url in &args.templates {
        templates.try_load_template(fetcher, url)?;
    }
    for path in &args.template_files {
        templates.add_template(read_template_file(path)?);
    }

    let loader = load_manifest(&args.manifest, fetcher)?;
    let opts = inspect::InspectOptions {
        pref_lang: args.lang,
        ..Default::default()
    };

    match loader.parser_with_templates(&templates) {
        Some(Resource::Manifest(manifest)) => {
            let report = inspect::inspect_manifest(&manifest, loader.version(), &opts);
            match args.output.as_str() {
                "json" => print_json(&report),
                _ => {
                    print!("{}", report);
                    Ok(())
                }
            }
        }
        Some(Resource::Collection(collection)) => {
            let report = inspect::inspect_collection(&collection, loader.version(), &opts);
            match args.output.as_str() {
                "json" => print_json(&report),
                _ => {
                    print!("{}", report);
                    Ok(())
                }
            }
        }
        _ => Err(IiifError::InvalidData),
    }
}

fn check_output_format(output: &str) -> Result<(), IiifError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(IiifError::UnsupportedOutput(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

/// Loads a manifest from a URL or a local file, printing every load error.
fn load_manifest(input: &str, fetcher: &dyn JsonFetcher) -> Result<ManifestLoader, IiifError> {
    let mut loader = ManifestLoader::new(manifest_source(input)?);
    loader.load(fetcher);
    if loader.has_errors() {
        for message in loader.error_messages() {
            println!("{message}");
        }
        return Err(IiifError::LoadFailed {
            error_count: loader.errors().len(),
        });
    }
    Ok(loader)
}

fn manifest_source(input: &str) -> Result<ManifestSource, IiifError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(ManifestSource::Url(input.to_string()));
    }
    let path = PathBuf::from(input);
    let text = std::fs::read_to_string(&path)?;
    let document =
        serde_json::from_str(&text).map_err(|source| IiifError::JsonParse { path, source })?;
    Ok(ManifestSource::Document(document))
}

fn read_template_file(path: &Path) -> Result<Template, IiifError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| IiifError::TemplateParse {
        url: path.display().to_string(),
        source,
    })
}

fn print_json(value: &impl serde::Serialize) -> Result<(), IiifError> {
    let text = serde_json::to_string_pretty(value).map_err(IiifError::JsonWrite)?;
    println!("{text}");
    Ok(())
}
