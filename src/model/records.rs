//! UI-ready records projected out of a manifest.
//!
//! These are the flattened views handed to a rendering layer. They are
//! plain owned data and serialize with camelCase field names.

use serde::Serialize;

use super::content::{ContentBlock, LegacyFields};
use super::target::Target;
use super::values::LocalizedText;

/// A metadata pair resolved to display strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub label: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequiredStatement {
    pub label: String,
    pub value: String,
}

/// Result of a metadata lookup by label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Values of the language the label matched in, joined with `"; "`.
    Matched(String),
    /// One display entry per language, each prefixed with the language name.
    Combined(Vec<String>),
}

/// A linked external resource (`homepage`, `seeAlso`, `rendering`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The painted media of a canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasMedia {
    /// A IIIF Image API service; `url` is the service base URL.
    Iiif {
        #[serde(rename = "isLevel0")]
        is_level0: bool,
        url: String,
    },
    /// A static image URL.
    Image { url: String },
    Audio {
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        url: String,
    },
    Video {
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<u64>,
    },
}

impl CanvasMedia {
    pub fn url(&self) -> &str {
        match self {
            CanvasMedia::Iiif { url, .. }
            | CanvasMedia::Image { url }
            | CanvasMedia::Audio { url, .. }
            | CanvasMedia::Video { url, .. } => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CanvasMedia::Iiif { .. } => "iiif",
            CanvasMedia::Image { .. } => "image",
            CanvasMedia::Audio { .. } => "audio",
            CanvasMedia::Video { .. } => "video",
        }
    }
}

/// A flattened canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CanvasMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ParsedAnnotation>,
}

/// One annotation expanded for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAnnotation {
    pub id: Option<String>,
    pub target: Option<Target>,
    /// Grouping key shared by annotations of the same annotation set.
    pub group: Option<String>,
    /// Pseudo-fields decoded with the plain-text body convention.
    pub data: LegacyFields,
    pub title: Option<LocalizedText>,
    pub content: Vec<ContentBlock>,
    pub line_color: Option<String>,
    pub line_weight: Option<String>,
    pub template_name: Option<String>,
}

/// A group of annotations, usually one annotation collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSet {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

/// A language used somewhere in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}
