//! Presentation 2.0 to 3.0 conversion.
//!
//! Legacy documents are rewritten into the canonical v3 shape before the
//! root is validated and projected. The conversion is structural: JSON-LD
//! keywords become plain keys, prefixed types lose their prefix, language
//! values become language maps, `sequences[0].canvases` become `items`, and
//! image annotations move into painting annotation pages.
//!
//! The result is not a complete v3 document. Fields the projection never
//! reads (`@context` of nested resources, `viewingHint` values without a v3
//! counterpart) are dropped.

mod ranges;

use serde_json::{json, Map, Value};

use crate::error::IiifError;
use crate::validation::PRESENTATION_3_CONTEXT;

const ATTRIBUTION_LABEL: &str = "Attribution";

/// Properties copied verbatim from a v2 resource.
const PASSTHROUGH_KEYS: [&str; 7] = [
    "width",
    "height",
    "format",
    "duration",
    "navDate",
    "viewingDirection",
    "language",
];

// ============================================================================
// Entry points
// ============================================================================

/// Converts a v2 manifest or collection into the v3 shape.
pub fn upgrade_document(document: &Value) -> Result<Value, IiifError> {
    let object = as_object(document, "document")?;
    let mut upgraded = match v3_type(object).as_deref() {
        Some("Collection") => upgrade_collection(object)?,
        _ => upgrade_manifest(object)?,
    };
    upgraded.insert("@context".to_string(), json!(PRESENTATION_3_CONTEXT));
    Ok(Value::Object(upgraded))
}

/// Converts a fetched v2 annotation list into an annotation page.
///
/// Documents that are not annotation lists are returned with their keys
/// converted, so the caller's type check decides whether they are used.
pub fn upgrade_annotation_page(document: &Value) -> Result<Value, IiifError> {
    let object = as_object(document, "annotation list")?;
    match v3_type(object).as_deref() {
        Some("AnnotationPage") => Ok(Value::Object(upgrade_annotation_list(object)?)),
        _ => Ok(Value::Object(upgrade_descriptive(object))),
    }
}

fn conversion_error(message: impl Into<String>) -> IiifError {
    IiifError::LegacyConversion {
        message: message.into(),
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, IiifError> {
    value
        .as_object()
        .ok_or_else(|| conversion_error(format!("{what} is not an object")))
}

/// Reads a property that must be a list when present. A single object is
/// accepted as a one-element list.
fn list_property<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a [Value], IiifError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(single @ Value::Object(_)) => Ok(std::slice::from_ref(single)),
        Some(_) => Err(conversion_error(format!("'{key}' is not a list"))),
    }
}

// ============================================================================
// Keys, types and values
// ============================================================================

fn v2_id(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("@id")
        .or_else(|| object.get("id"))
        .and_then(Value::as_str)
}

/// The v3 type name for a v2 `@type`.
fn v3_type(object: &Map<String, Value>) -> Option<String> {
    let declared = object
        .get("@type")
        .or_else(|| object.get("type"))
        .and_then(|value| match value {
            Value::Array(types) => types.first(),
            other => Some(other),
        })
        .and_then(Value::as_str)?;
    Some(map_type(declared).to_string())
}

fn map_type(declared: &str) -> &str {
    match declared {
        "sc:AnnotationList" => "AnnotationPage",
        "sc:Layer" => "AnnotationCollection",
        "cnt:ContentAsText" | "dctypes:Text" => "Text",
        other => other.rsplit(':').next().unwrap_or(other),
    }
}

/// `oa:commenting` to `commenting`; `sc:painting` to `painting`.
fn map_motivation(value: &Value) -> Value {
    match value {
        Value::String(motivation) => json!(map_type(motivation)),
        Value::Array(motivations) => {
            Value::Array(motivations.iter().map(map_motivation).collect())
        }
        other => other.clone(),
    }
}

/// Converts a v2 language value into a v3 language map.
///
/// Accepts a plain string, a `{"@value", "@language"}` object, or a list
/// mixing both. Values without a language go under `none`.
fn language_map(value: &Value) -> Option<Value> {
    let mut map = Map::new();
    collect_language_values(value, &mut map);
    (!map.is_empty()).then_some(Value::Object(map))
}

fn collect_language_values(value: &Value, map: &mut Map<String, Value>) {
    match value {
        Value::String(text) => push_language_value(map, "none", text.clone()),
        Value::Number(number) => push_language_value(map, "none", number.to_string()),
        Value::Bool(flag) => push_language_value(map, "none", flag.to_string()),
        Value::Object(object) => {
            if let Some(text) = object.get("@value").and_then(Value::as_str) {
                let lang = object
                    .get("@language")
                    .and_then(Value::as_str)
                    .unwrap_or("none");
                push_language_value(map, lang, text.to_string());
            }
        }
        Value::Array(values) => {
            for item in values {
                collect_language_values(item, map);
            }
        }
        Value::Null => {}
    }
}

fn push_language_value(map: &mut Map<String, Value>, lang: &str, text: String) {
    let entry = map.entry(lang.to_string()).or_insert_with(|| json!([]));
    if let Value::Array(values) = entry {
        values.push(Value::String(text));
    }
}

fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(text) => vec![text.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::Object(object) => v2_id(object).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn reference(id: &str, kind: &str) -> Value {
    json!({"id": id, "type": kind})
}

/// Converts `@id`/`@type`, the descriptive properties and the passthrough
/// keys shared by every v2 resource.
fn upgrade_descriptive(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(id) = v2_id(object) {
        out.insert("id".to_string(), json!(id));
    }
    if let Some(kind) = v3_type(object) {
        out.insert("type".to_string(), json!(kind));
    }
    if let Some(label) = object.get("label").and_then(language_map) {
        out.insert("label".to_string(), label);
    }
    if let Some(summary) = object.get("description").and_then(language_map) {
        out.insert("summary".to_string(), summary);
    }
    if let Some(metadata) = object.get("metadata").and_then(upgrade_metadata) {
        out.insert("metadata".to_string(), metadata);
    }
    if let Some(attribution) = object.get("attribution").and_then(language_map) {
        out.insert(
            "requiredStatement".to_string(),
            json!({"label": {"en": [ATTRIBUTION_LABEL]}, "value": attribution}),
        );
    }
    let license = object
        .get("license")
        .and_then(|value| string_values(value).first().copied());
    if let Some(license) = license {
        out.insert("rights".to_string(), json!(license));
    }
    if let Some(thumbnail) = object.get("thumbnail").map(upgrade_image_references) {
        out.insert("thumbnail".to_string(), thumbnail);
    }
    if let Some(logo) = object.get("logo").map(upgrade_image_references) {
        out.insert(
            "provider".to_string(),
            json!([{"type": "Agent", "logo": logo}]),
        );
    }
    for (v2_key, v3_key, kind) in [
        ("related", "homepage", "Text"),
        ("seeAlso", "seeAlso", "Dataset"),
        ("rendering", "rendering", "Text"),
    ] {
        if let Some(links) = object.get(v2_key).map(|value| upgrade_links(value, kind)) {
            out.insert(v3_key.to_string(), links);
        }
    }
    if let Some(hint) = object.get("viewingHint") {
        let behavior: Vec<&str> = string_values(hint);
        if !behavior.is_empty() {
            out.insert("behavior".to_string(), json!(behavior));
        }
    }
    if let Some(service) = object.get("service") {
        out.insert("service".to_string(), upgrade_services(service));
    }
    for key in PASSTHROUGH_KEYS {
        if let Some(value) = object.get(key) {
            out.insert(key.to_string(), value.clone());
        }
    }
    out
}

fn upgrade_metadata(value: &Value) -> Option<Value> {
    let entries: Vec<Value> = value
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let label = entry.get("label").and_then(language_map)?;
            let value = entry
                .get("value")
                .and_then(language_map)
                .unwrap_or_else(|| json!({"none": [""]}));
            Some(json!({"label": label, "value": value}))
        })
        .collect();
    Some(Value::Array(entries))
}

/// `related`/`seeAlso`/`rendering`: strings or objects become typed links.
fn upgrade_links(value: &Value, kind: &str) -> Value {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    let links = items.iter().filter_map(|item| match item {
        Value::String(id) => Some(reference(id, kind)),
        Value::Object(object) => {
            let mut link = Map::new();
            link.insert("id".to_string(), json!(v2_id(object)?));
            link.insert("type".to_string(), json!(kind));
            if let Some(label) = object.get("label").and_then(language_map) {
                link.insert("label".to_string(), label);
            }
            if let Some(format) = object.get("format") {
                link.insert("format".to_string(), format.clone());
            }
            if let Some(profile) = object.get("profile") {
                link.insert("profile".to_string(), profile.clone());
            }
            Some(Value::Object(link))
        }
        _ => None,
    });
    Value::Array(links.collect())
}

/// `thumbnail`/`logo`: image URLs or image objects with services.
fn upgrade_image_references(value: &Value) -> Value {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    let images = items.iter().filter_map(|item| match item {
        Value::String(id) => Some(reference(id, "Image")),
        Value::Object(object) => {
            let mut image = upgrade_descriptive(object);
            image.insert("type".to_string(), json!("Image"));
            image.contains_key("id").then_some(Value::Object(image))
        }
        _ => None,
    });
    Value::Array(images.collect())
}

/// Image API services gain an explicit service type.
fn upgrade_services(value: &Value) -> Value {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    let services = items.iter().filter_map(|item| {
        let object = item.as_object()?;
        let mut service = Map::new();
        if let Some(id) = v2_id(object) {
            service.insert("id".to_string(), json!(id));
        }
        let context = object
            .get("@context")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let kind = if context.contains("/image/2/") {
            "ImageService2".to_string()
        } else if context.contains("/image/1/") {
            "ImageService1".to_string()
        } else {
            v3_type(object).unwrap_or_else(|| "Service".to_string())
        };
        service.insert("type".to_string(), json!(kind));
        if let Some(profile) = object.get("profile") {
            service.insert("profile".to_string(), profile.clone());
        }
        Some(Value::Object(service))
    });
    Value::Array(services.collect())
}

// ============================================================================
// Manifests and collections
// ============================================================================

fn upgrade_manifest(manifest: &Map<String, Value>) -> Result<Map<String, Value>, IiifError> {
    let mut out = upgrade_descriptive(manifest);

    if let Some(within) = manifest.get("within") {
        let part_of: Vec<Value> = string_values(within)
            .into_iter()
            .map(|id| reference(id, "Collection"))
            .collect();
        if !part_of.is_empty() {
            out.insert("partOf".to_string(), Value::Array(part_of));
        }
    }

    let sequences = list_property(manifest, "sequences")?;
    let mut start = manifest.get("startCanvas");
    let mut items = Vec::new();
    if let Some(sequence) = sequences.first() {
        let sequence = as_object(sequence, "sequence")?;
        start = start.or_else(|| sequence.get("startCanvas"));
        if !out.contains_key("viewingDirection") {
            if let Some(direction) = sequence.get("viewingDirection") {
                out.insert("viewingDirection".to_string(), direction.clone());
            }
        }
        for canvas in list_property(sequence, "canvases")? {
            let canvas = upgrade_canvas(as_object(canvas, "canvas")?)?;
            items.push(Value::Object(canvas));
        }
    }
    out.insert("items".to_string(), Value::Array(items));

    if let Some(start) = start.and_then(|value| string_values(value).first().copied()) {
        out.insert("start".to_string(), reference(start, "Canvas"));
    }

    let structures = ranges::upgrade_structures(list_property(manifest, "structures")?)?;
    if !structures.is_empty() {
        out.insert("structures".to_string(), Value::Array(structures));
    }

    Ok(out)
}

fn upgrade_collection(collection: &Map<String, Value>) -> Result<Map<String, Value>, IiifError> {
    let mut out = upgrade_descriptive(collection);
    let mut items = Vec::new();

    for (key, kind) in [
        ("collections", Some("Collection")),
        ("manifests", Some("Manifest")),
        ("members", None),
    ] {
        for member in list_property(collection, key)? {
            items.push(upgrade_member(member, kind)?);
        }
    }

    out.insert("items".to_string(), Value::Array(items));
    Ok(out)
}

/// A collection member. `members` entries keep their declared type; bare
/// references there are taken to be manifests.
fn upgrade_member(member: &Value, kind: Option<&str>) -> Result<Value, IiifError> {
    let object = match member {
        Value::String(id) => return Ok(reference(id, kind.unwrap_or("Manifest"))),
        Value::Object(object) => object,
        _ => return Err(conversion_error("collection member is not an object")),
    };
    let nested = ["collections", "manifests", "members"]
        .iter()
        .any(|key| object.contains_key(*key));
    let mut entry = if nested && v3_type(object).as_deref() == Some("Collection") {
        upgrade_collection(object)?
    } else {
        upgrade_descriptive(object)
    };
    if let Some(kind) = kind {
        entry.insert("type".to_string(), json!(kind));
    }
    Ok(Value::Object(entry))
}

// ============================================================================
// Canvases and annotations
// ============================================================================

fn upgrade_canvas(canvas: &Map<String, Value>) -> Result<Map<String, Value>, IiifError> {
    let mut out = upgrade_descriptive(canvas);
    out.insert("type".to_string(), json!("Canvas"));
    let canvas_id = v2_id(canvas).unwrap_or_default().to_string();

    let mut painting = Vec::new();
    for image in list_property(canvas, "images")? {
        let annotation = upgrade_annotation(as_object(image, "image annotation")?)?;
        painting.push(Value::Object(annotation));
    }
    for media in list_property(canvas, "content")? {
        let annotation = upgrade_annotation(as_object(media, "content annotation")?)?;
        painting.push(Value::Object(annotation));
    }
    if !painting.is_empty() {
        out.insert(
            "items".to_string(),
            json!([{
                "id": format!("{canvas_id}/page/painting"),
                "type": "AnnotationPage",
                "items": painting
            }]),
        );
    }

    let other_content: Vec<&Value> = match canvas.get("otherContent") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(pages)) => pages.iter().collect(),
        Some(single @ (Value::String(_) | Value::Object(_))) => vec![single],
        Some(_) => return Err(conversion_error("'otherContent' is not a list")),
    };
    let mut pages = Vec::new();
    for page in other_content {
        match page {
            Value::String(id) => pages.push(reference(id, "AnnotationPage")),
            Value::Object(object) => pages.push(Value::Object(upgrade_annotation_list(object)?)),
            _ => return Err(conversion_error("'otherContent' entry is not a reference")),
        }
    }
    if !pages.is_empty() {
        out.insert("annotations".to_string(), Value::Array(pages));
    }

    Ok(out)
}

/// Converts an annotation list. Lists without `resources` stay stubs so the
/// loader can fetch them.
fn upgrade_annotation_list(list: &Map<String, Value>) -> Result<Map<String, Value>, IiifError> {
    let mut out = upgrade_descriptive(list);
    out.insert("type".to_string(), json!("AnnotationPage"));

    if let Some(within) = list.get("within") {
        let part_of = upgrade_layers(within);
        if !part_of.is_empty() {
            out.insert("partOf".to_string(), Value::Array(part_of));
        }
    }

    if list.contains_key("resources") {
        let mut items = Vec::new();
        for annotation in list_property(list, "resources")? {
            let annotation = upgrade_annotation(as_object(annotation, "annotation")?)?;
            items.push(Value::Object(annotation));
        }
        out.insert("items".to_string(), Value::Array(items));
    }
    Ok(out)
}

/// `within` layers become `AnnotationCollection` references.
fn upgrade_layers(value: &Value) -> Vec<Value> {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(reference(id, "AnnotationCollection")),
            Value::Object(object) => {
                let mut layer = upgrade_descriptive(object);
                layer.get("id")?;
                layer.insert("type".to_string(), json!("AnnotationCollection"));
                Some(Value::Object(layer))
            }
            _ => None,
        })
        .collect()
}

fn upgrade_annotation(annotation: &Map<String, Value>) -> Result<Map<String, Value>, IiifError> {
    let mut out = upgrade_descriptive(annotation);
    out.insert("type".to_string(), json!("Annotation"));

    if let Some(motivation) = annotation.get("motivation") {
        out.insert("motivation".to_string(), map_motivation(motivation));
    }

    if let Some(resource) = annotation.get("resource").or_else(|| annotation.get("body")) {
        let body = match resource {
            Value::Array(resources) => Value::Array(
                resources
                    .iter()
                    .map(upgrade_body)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            single => upgrade_body(single)?,
        };
        out.insert("body".to_string(), body);
    }

    if let Some(on) = annotation.get("on").or_else(|| annotation.get("target")) {
        out.insert("target".to_string(), upgrade_target(on)?);
    }

    if let Some(style) = annotation.get("stylesheet").and_then(|sheet| sheet.get("chars")) {
        out.insert("stylesheet".to_string(), json!({"type": "CssStylesheet", "value": style}));
    }

    Ok(out)
}

fn upgrade_body(resource: &Value) -> Result<Value, IiifError> {
    let object = match resource {
        Value::String(id) => return Ok(json!({"id": id})),
        Value::Object(object) => object,
        _ => return Err(conversion_error("annotation resource is not an object")),
    };

    let mut body = match v3_type(object).as_deref() {
        Some("Choice") => {
            let default = object.get("default").or_else(|| {
                object
                    .get("item")
                    .and_then(|items| items.as_array().and_then(|items| items.first()))
            });
            return match default {
                Some(choice) => upgrade_body(choice),
                None => Err(conversion_error("choice without a default resource")),
            };
        }
        Some("SpecificResource") => {
            let mut specific = upgrade_descriptive(object);
            if let Some(full) = object.get("full") {
                specific.insert("source".to_string(), upgrade_body(full)?);
            }
            if let Some(selector) = object.get("selector") {
                specific.insert("selector".to_string(), upgrade_selector(selector));
            }
            specific
        }
        _ => upgrade_descriptive(object),
    };

    if let Some(chars) = object.get("chars") {
        body.insert("chars".to_string(), chars.clone());
    }
    if let Some(purpose) = object.get("purpose") {
        body.insert("purpose".to_string(), map_motivation(purpose));
    }
    Ok(Value::Object(body))
}

fn upgrade_target(on: &Value) -> Result<Value, IiifError> {
    match on {
        Value::String(uri) => Ok(json!(uri)),
        Value::Array(targets) => Ok(Value::Array(
            targets.iter().map(upgrade_target).collect::<Result<_, _>>()?,
        )),
        Value::Object(object) => {
            let Some(full) = object.get("full") else {
                return Ok(Value::Object(upgrade_descriptive(object)));
            };
            let source = match full {
                Value::String(uri) => json!(uri),
                Value::Object(canvas) => v2_id(canvas).map(|id| json!(id)).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            let mut target = Map::new();
            target.insert("type".to_string(), json!("SpecificResource"));
            target.insert("source".to_string(), source);
            if let Some(selector) = object.get("selector") {
                target.insert("selector".to_string(), upgrade_selector(selector));
            }
            Ok(Value::Object(target))
        }
        _ => Err(conversion_error("annotation target is not a reference")),
    }
}

/// v2 selectors. A `Choice` selector becomes a list, default first.
fn upgrade_selector(selector: &Value) -> Value {
    let Some(object) = selector.as_object() else {
        return selector.clone();
    };
    match v3_type(object).as_deref() {
        Some("Choice") => {
            let mut choices = Vec::new();
            if let Some(default) = object.get("default") {
                choices.push(upgrade_selector(default));
            }
            let items: &[Value] = match object.get("item") {
                Some(Value::Array(items)) => items,
                Some(single) => std::slice::from_ref(single),
                None => &[],
            };
            choices.extend(items.iter().map(upgrade_selector));
            Value::Array(choices)
        }
        kind => {
            let mut out = Map::new();
            for (key, value) in object {
                match key.as_str() {
                    "@type" | "type" | "@context" => {}
                    "chars" => {
                        out.insert("value".to_string(), value.clone());
                    }
                    "@id" => {
                        out.insert("id".to_string(), value.clone());
                    }
                    _ => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            if let Some(kind) = kind {
                out.insert("type".to_string(), json!(kind));
            }
            Value::Object(out)
        }
    }
}
