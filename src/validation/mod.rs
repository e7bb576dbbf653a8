//! Manifest validation.
//!
//! Two levels of checking:
//! - Fatal structural checks used by the loader: the `@context` must name a
//!   supported Presentation API version, and the root must be a `Manifest`
//!   or a non-empty `Collection`.
//! - A non-fatal lint over a loaded canonical manifest, reported as a
//!   [`ValidationReport`].

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::error::IiifError;
use crate::manifest::canvas::canvas_image;
use crate::resource::{as_items, ResourceParser};

pub const PRESENTATION_2_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
pub const PRESENTATION_3_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// A supported Presentation API version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiVersion {
    V2,
    V3,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2 => "2.0",
            ApiVersion::V3 => "3.0",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The root type of a canonical document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootType {
    Manifest,
    Collection,
}

/// The deciding `@context` entry: the value itself, or the last element of
/// a list.
pub fn document_context(document: &Value) -> Option<&Value> {
    match document.get("@context")? {
        Value::Null => None,
        Value::Array(contexts) => contexts.last(),
        context => Some(context),
    }
}

/// Detects the Presentation API version from `@context`.
pub fn detect_version(document: &Value) -> Result<ApiVersion, IiifError> {
    let context = document_context(document).ok_or(IiifError::MissingContext)?;
    match context.as_str() {
        Some(PRESENTATION_2_CONTEXT) => Ok(ApiVersion::V2),
        Some(PRESENTATION_3_CONTEXT) => Ok(ApiVersion::V3),
        Some(other) => Err(IiifError::UnsupportedVersion {
            context: other.to_string(),
        }),
        None => Err(IiifError::UnsupportedVersion {
            context: context.to_string(),
        }),
    }
}

/// Checks the root type of a canonical document.
pub fn validate_root(document: &Value) -> Result<RootType, IiifError> {
    match document.get("type").and_then(Value::as_str) {
        Some("Manifest") => Ok(RootType::Manifest),
        Some("Collection") => {
            let empty = document
                .get("items")
                .and_then(Value::as_array)
                .is_none_or(Vec::is_empty);
            if empty {
                Err(IiifError::EmptyCollection)
            } else {
                Ok(RootType::Collection)
            }
        }
        Some(other) => Err(IiifError::InvalidType {
            found: other.to_string(),
        }),
        None => Err(IiifError::InvalidType {
            found: "none".to_string(),
        }),
    }
}

/// Lints a loaded canonical manifest.
pub fn lint_manifest(manifest: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let parser = ResourceParser::new(manifest);

    if parser.label(None).is_none() {
        report.add(ValidationIssue::warning(
            IssueCode::MissingLabel,
            "Manifest has no label",
            IssueContext::Manifest,
        ));
    }

    let canvases: Vec<&Value> = parser
        .get("items")
        .map(as_items)
        .into_iter()
        .flatten()
        .filter(|item| ResourceParser::new(item).resource_type() == Some("Canvas"))
        .collect();
    if canvases.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::NoCanvases,
            "Manifest has no canvases",
            IssueContext::Manifest,
        ));
    }

    let canvas_ids = lint_canvases(&canvases, &mut report);

    for canvas in &canvases {
        lint_annotations(canvas, &canvas_ids, &mut report);
    }

    if let Some(start) = crate::manifest::ManifestParser::new(manifest).start_canvas() {
        if !canvas_ids.contains(start) {
            report.add(ValidationIssue::warning(
                IssueCode::UnknownStartCanvas,
                format!("Start canvas {start} is not in the manifest"),
                IssueContext::Manifest,
            ));
        }
    }

    report
}

fn lint_canvases<'a>(canvases: &[&'a Value], report: &mut ValidationReport) -> HashSet<&'a str> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    for (idx, canvas) in canvases.iter().enumerate() {
        let Some(id) = ResourceParser::new(canvas).id() else {
            report.add(ValidationIssue::error(
                IssueCode::MissingCanvasId,
                "Canvas has no id",
                IssueContext::Canvas(format!("#{idx}")),
            ));
            continue;
        };

        if !seen.insert(id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCanvasId,
                format!("Duplicate canvas id (canvas #{idx})"),
                IssueContext::Canvas(id.to_string()),
            ));
        }

        if canvas_image(canvas).is_none() {
            report.add(ValidationIssue::warning(
                IssueCode::CanvasWithoutMedia,
                "No painting annotation resolves to media",
                IssueContext::Canvas(id.to_string()),
            ));
        }
    }
    seen
}

fn lint_annotations(canvas: &Value, canvas_ids: &HashSet<&str>, report: &mut ValidationReport) {
    let pages = canvas.get("annotations").map(as_items).into_iter().flatten();
    for page in pages {
        let page_parser = ResourceParser::new(page);
        let page_id = page_parser.id().unwrap_or("(no id)").to_string();
        let Some(items) = page_parser.get("items") else {
            report.add(ValidationIssue::warning(
                IssueCode::UnresolvedAnnotationPage,
                "Annotation page was not resolved",
                IssueContext::AnnotationPage(page_id),
            ));
            continue;
        };

        for annotation in as_items(items) {
            let parser = ResourceParser::new(annotation);
            let id = parser.id().unwrap_or("(no id)").to_string();
            let target = parser
                .get("target")
                .and_then(crate::annotation::target::normalize_target);
            match target.and_then(|target| target.source) {
                None => report.add(ValidationIssue::warning(
                    IssueCode::MissingTarget,
                    "Annotation has no usable target",
                    IssueContext::Annotation(id),
                )),
                Some(source) if !canvas_ids.contains(source.as_str()) => {
                    report.add(ValidationIssue::warning(
                        IssueCode::UnknownTargetCanvas,
                        format!("Target {source} is not a canvas of the manifest"),
                        IssueContext::Annotation(id),
                    ))
                }
                Some(_) => {}
            }
        }
    }
}
