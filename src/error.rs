use std::path::PathBuf;
use thiserror::Error;

/// The main error type for iiif-ingest operations.
///
/// The `Display` output of the manifest validation variants is the
/// human-readable message the loader records in its error list.
#[derive(Debug, Error)]
pub enum IiifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to load manifest from its URL")]
    ManifestUnreachable { url: String, message: String },

    #[error("Invalid manifest data")]
    InvalidData,

    #[error("Invalid manifest: missing context")]
    MissingContext,

    #[error("Invalid manifest: unsupported version {context}")]
    UnsupportedVersion { context: String },

    #[error("Invalid manifest: failed to parse the legacy v2 format ({message})")]
    LegacyConversion { message: String },

    #[error("Invalid manifest: invalid type {found}")]
    InvalidType { found: String },

    #[error("Invalid manifest: the collection is empty")]
    EmptyCollection,

    #[error("Invalid template from {url}: {source}")]
    TemplateParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest failed to load with {error_count} error(s)")]
    LoadFailed { error_count: usize },

    #[error("Lint failed with {error_count} error(s) and {warning_count} warning(s)")]
    LintFailed {
        error_count: usize,
        warning_count: usize,
    },

    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[source] serde_json::Error),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
}
