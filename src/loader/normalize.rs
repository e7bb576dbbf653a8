//! Post-conversion clean-up of legacy annotation shapes.

use serde_json::{Map, Value};

const TEXTUAL_BODY: &str = "TextualBody";

/// Normalizes every annotation of a converted v2 document in place.
///
/// - A `motivation` list collapses to its first entry.
/// - `Text`/`TextualBody` bodies carrying `chars` become `TextualBody`
///   bodies with the text under `value`.
pub fn normalize_v2(document: &mut Value) {
    let Some(canvases) = document.get_mut("items").and_then(Value::as_array_mut) else {
        return;
    };
    for canvas in canvases {
        for key in ["items", "annotations"] {
            let Some(pages) = canvas.get_mut(key).and_then(Value::as_array_mut) else {
                continue;
            };
            for page in pages {
                let Some(annotations) = page.get_mut("items").and_then(Value::as_array_mut) else {
                    continue;
                };
                for annotation in annotations.iter_mut().filter_map(Value::as_object_mut) {
                    normalize_annotation(annotation);
                }
            }
        }
    }
}

fn normalize_annotation(annotation: &mut Map<String, Value>) {
    if let Some(Value::Array(motivations)) = annotation.get("motivation") {
        let first = motivations.first().cloned().unwrap_or(Value::Null);
        annotation.insert("motivation".to_string(), first);
    }

    match annotation.get_mut("body") {
        Some(Value::Array(bodies)) => {
            for body in bodies.iter_mut().filter_map(Value::as_object_mut) {
                normalize_body(body);
            }
        }
        Some(Value::Object(body)) => normalize_body(body),
        _ => {}
    }
}

fn normalize_body(body: &mut Map<String, Value>) {
    let is_text = matches!(
        body.get("type").and_then(Value::as_str),
        Some("Text" | TEXTUAL_BODY)
    );
    if !is_text {
        return;
    }
    if let Some(chars) = body.remove("chars") {
        body.insert("type".to_string(), Value::String(TEXTUAL_BODY.to_string()));
        body.insert("value".to_string(), chars);
    }
}
