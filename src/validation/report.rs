//! Structural lint report types.
//!
//! A loaded manifest can still carry shapes a viewer cannot use: canvases
//! without an id, annotations without a target, annotation pages that could
//! not be resolved. These are collected as issues rather than load errors.

use std::fmt;

use serde::Serialize;

/// The result of linting a manifest.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found, in document order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Appends an issue in document order.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Lint passed: no issues found");
        }

        writeln!(
            f,
            "Lint completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single lint issue.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    /// How badly the issue affects display.
    pub severity: Severity,
    /// A stable code for the issue type.
    pub code: IssueCode,
    /// A human-readable description of the issue.
    pub message: String,
    /// Where in the manifest the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    /// Creates a new lint issue.
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new error.
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    /// Creates a new warning.
    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a lint issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The viewer degrades but can still display the manifest.
    Warning,
    /// Part of the manifest cannot be displayed at all.
    Error,
}

/// A stable code identifying the kind of lint issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    /// The manifest has no `label`.
    MissingLabel,
    /// The manifest has no canvases.
    NoCanvases,
    /// A canvas has no `id`.
    MissingCanvasId,
    /// Two canvases share an `id`.
    DuplicateCanvasId,
    /// A canvas has no painting annotation that resolves to media.
    CanvasWithoutMedia,
    /// An annotation page is still an unresolved reference.
    UnresolvedAnnotationPage,
    /// An annotation has no usable `target`.
    MissingTarget,
    /// An annotation targets a canvas that is not in the manifest.
    UnknownTargetCanvas,
    /// The declared start canvas is not in the manifest.
    UnknownStartCanvas,
}

/// Where a lint issue occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum IssueContext {
    Manifest,
    /// A canvas, by index when it has no id.
    Canvas(String),
    AnnotationPage(String),
    Annotation(String),
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Manifest => write!(f, "manifest"),
            IssueContext::Canvas(id) => write!(f, "canvas {}", id),
            IssueContext::AnnotationPage(id) => write!(f, "annotation page {}", id),
            IssueContext::Annotation(id) => write!(f, "annotation {}", id),
        }
    }
}
