//! Fuzz target for annotation decoding.
//!
//! Arbitrary bytes are used as a textual body value, both as HTML and as
//! the plain-text `Label: value` convention, under tagging and commenting
//! motivations.
//!
//! Run with:
//!   cargo +nightly fuzz run annotation_body

#![no_main]

use iiif_ingest::annotation::AnnotationParser;
use iiif_ingest::TemplateRegistry;
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let text = String::from_utf8_lossy(data);
    let templates = TemplateRegistry::new();

    for motivation in ["tagging", "commenting"] {
        let annotation = json!({
            "type": "Annotation",
            "motivation": motivation,
            "body": [
                {"type": "TextualBody", "format": "text/html", "value": text},
                {"type": "TextualBody", "value": text}
            ],
            "target": {
                "type": "SpecificResource",
                "source": "https://x/canvas/1",
                "selector": {"type": "SvgSelector", "value": text}
            }
        });
        let parser = AnnotationParser::new(&annotation, &templates);
        let _ = parser.content();
        let _ = parser.legacy_fields();
        let _ = parser.target();
    }
});
