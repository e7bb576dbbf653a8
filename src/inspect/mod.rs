//! Manifest inspection.
//!
//! Builds the full viewer projection of a loaded manifest together with
//! summary counts, for terminal display or JSON export.

mod report;

pub use report::{
    CollectionReport, InspectReport, MediaCount, MemberEntry, SummarySection,
};

use serde_json::Value;

use crate::manifest::ManifestParser;
use crate::model::Canvas;
use crate::resource::CollectionParser;
use crate::validation::ApiVersion;

/// Options for manifest inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Preferred language for labels and descriptions.
    pub pref_lang: Option<String>,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            pref_lang: None,
            bar_width: 20,
        }
    }
}

/// Media kinds in display order; canvases without media count as `none`.
const MEDIA_KINDS: [&str; 5] = ["iiif", "image", "audio", "video", "none"];

pub fn inspect_manifest(
    parser: &ManifestParser<'_>,
    version: Option<ApiVersion>,
    opts: &InspectOptions,
) -> InspectReport {
    let pref_lang = opts.pref_lang.as_deref();
    let canvases = parser.canvases(pref_lang);
    let annotation_sets = parser.annotation_sets(pref_lang);
    let languages = parser.languages();

    let mut ranges = 0;
    parser.structure_traverse(|node: &Value| {
        if node.get("type").and_then(Value::as_str) == Some("Range") {
            ranges += 1;
        }
    });

    let summary = SummarySection {
        canvases: canvases.len(),
        canvases_with_media: canvases.iter().filter(|c| c.image.is_some()).count(),
        annotations: canvases.iter().map(|c| c.annotations.len()).sum(),
        annotation_sets: annotation_sets.len(),
        languages: languages.len(),
        ranges,
    };

    InspectReport {
        id: parser.id().map(str::to_string),
        label: parser.label(pref_lang),
        version: version.map(|v| v.to_string()),
        summary,
        media: media_counts(&canvases),
        start_canvas: parser.start_canvas().map(str::to_string),
        canvases,
        annotation_sets,
        languages,
        structures: parser.structures().to_vec(),
        bar_width: opts.bar_width,
    }
}

fn media_counts(canvases: &[Canvas]) -> Vec<MediaCount> {
    MEDIA_KINDS
        .iter()
        .map(|kind| MediaCount {
            kind: kind.to_string(),
            count: canvases
                .iter()
                .filter(|canvas| {
                    canvas.image.as_ref().map_or("none", |media| media.kind()) == *kind
                })
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect()
}

pub fn inspect_collection(
    parser: &CollectionParser<'_>,
    version: Option<ApiVersion>,
    opts: &InspectOptions,
) -> CollectionReport {
    let pref_lang = opts.pref_lang.as_deref();
    CollectionReport {
        id: parser.id().map(str::to_string),
        label: parser.label(pref_lang),
        version: version.map(|v| v.to_string()),
        members: parser
            .members()
            .iter()
            .map(|member| MemberEntry {
                id: member.id().map(str::to_string),
                kind: member
                    .base()
                    .resource_type()
                    .unwrap_or(member.kind())
                    .to_string(),
                label: member.base().label(pref_lang),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> Value {
        json!({
            "id": "https://x/manifest",
            "type": "Manifest",
            "label": {"en": ["Atlas"]},
            "items": [
                {
                    "id": "https://x/canvas/1",
                    "type": "Canvas",
                    "items": [{"type": "AnnotationPage", "items": [{
                        "type": "Annotation",
                        "motivation": "painting",
                        "body": {"id": "https://x/1.jpg", "type": "Image"}
                    }]}],
                    "annotations": [{"id": "https://x/page/1", "type": "AnnotationPage", "items": [
                        {"id": "https://x/anno/1", "type": "Annotation", "body": {"type": "TextualBody", "value": "Note: hi"}, "target": "https://x/canvas/1"}
                    ]}]
                },
                {"id": "https://x/canvas/2", "type": "Canvas"}
            ],
            "structures": [{"id": "https://x/r/0", "type": "Range", "items": [
                {"id": "https://x/r/1", "type": "Range", "items": [{"id": "https://x/canvas/1", "type": "Canvas"}]}
            ]}]
        })
    }

    #[test]
    fn summary_counts() {
        let data = manifest();
        let report = inspect_manifest(
            &ManifestParser::new(&data),
            Some(ApiVersion::V3),
            &InspectOptions::default(),
        );
        assert_eq!(
            report.summary,
            SummarySection {
                canvases: 2,
                canvases_with_media: 1,
                annotations: 1,
                annotation_sets: 1,
                languages: 1,
                ranges: 2,
            }
        );
        assert_eq!(
            report.media,
            vec![
                MediaCount { kind: "image".to_string(), count: 1 },
                MediaCount { kind: "none".to_string(), count: 1 },
            ]
        );
        assert_eq!(report.version.as_deref(), Some("3.0"));
        assert!(report.to_string().contains("Manifest Inspection Report"));
    }

    #[test]
    fn json_export_uses_camel_case() {
        let data = manifest();
        let report = inspect_manifest(&ManifestParser::new(&data), None, &InspectOptions::default());
        let exported = serde_json::to_value(&report).unwrap();
        assert_eq!(exported["summary"]["canvasesWithMedia"], json!(1));
        assert_eq!(exported["annotationSets"][0]["id"], json!("https://x/page/1"));
        assert!(exported.get("barWidth").is_none());
    }

    #[test]
    fn collection_members() {
        let data = json!({
            "type": "Collection",
            "label": {"en": ["Atlases"]},
            "items": [
                {"id": "https://x/m1", "type": "Manifest", "label": {"en": ["One"]}},
                {"id": "https://x/c1", "type": "Collection"}
            ]
        });
        let report = inspect_collection(&CollectionParser::new(&data), None, &InspectOptions::default());
        assert_eq!(report.members.len(), 2);
        assert_eq!(report.members[0].label.as_deref(), Some("One"));
        assert_eq!(report.members[1].kind, "Collection");
    }
}
