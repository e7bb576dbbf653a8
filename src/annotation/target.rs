//! Annotation target normalization.
//!
//! Targets arrive as bare canvas URIs, URIs with an inline `#xywh=`
//! fragment, or `SpecificResource` nodes carrying a point, fragment or SVG
//! selector. They all collapse onto [`Target`]: a whole-canvas reference, a
//! `xywh=pixel:` media fragment, or canonical SVG markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::model::{RenderedVia, Selector, Target};
use crate::resource::{ResourceParser, SpecificResourceParser};

static INLINE_XYWH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#xywh=(\d+,\d+,\d+,\d+)$").unwrap());

static SVG_GROUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?g(?:\s[^>]*)?/?>").unwrap());

static SVG_ROOT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b[^>]*?(/?)>").unwrap());

static PATH_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<path\b[^>]*>").unwrap());

static PATH_D_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\sd\s*=\s*)("[^"]*"|'[^']*')"#).unwrap());

/// Normalizes a raw `target` value.
///
/// Lists use their first member. Returns `None` when no source can be read.
pub fn normalize_target(target: &Value) -> Option<Target> {
    match target {
        Value::String(uri) => Some(normalize_uri(uri)),
        Value::Array(targets) => targets.first().and_then(normalize_target),
        Value::Object(_) => {
            let parser = ResourceParser::new(target);
            if parser.resource_type() == Some("SpecificResource") {
                Some(normalize_specific_resource(SpecificResourceParser::new(target)))
            } else {
                parser.id().map(normalize_uri)
            }
        }
        _ => None,
    }
}

fn normalize_uri(uri: &str) -> Target {
    match INLINE_XYWH.captures(uri) {
        Some(captures) => {
            let (whole, [xywh]) = captures.extract();
            Target {
                source: Some(uri[..uri.len() - whole.len()].to_string()),
                selector: Some(Selector::Fragment {
                    value: format!("xywh=pixel:{xywh}"),
                }),
                rendered_via: None,
            }
        }
        None => Target::whole(uri),
    }
}

fn normalize_specific_resource(parser: SpecificResourceParser<'_>) -> Target {
    let source = parser.source_id().map(str::to_string);
    let Some(selector) = parser.selector() else {
        return Target {
            source,
            selector: None,
            rendered_via: None,
        };
    };

    let selector_type = selector.get("type").and_then(Value::as_str);
    let value = selector.get("value").and_then(Value::as_str);
    match (selector_type, value) {
        (Some("PointSelector"), _) => {
            let x = number_text(selector.get("x"));
            let y = number_text(selector.get("y"));
            Target {
                source,
                selector: Some(Selector::Fragment {
                    value: format!("xywh=pixel:{x},{y},0,0"),
                }),
                rendered_via: Some(RenderedVia::point()),
            }
        }
        (Some("FragmentSelector"), Some(value)) => Target {
            source,
            selector: Some(Selector::Fragment {
                value: with_pixel_unit(value),
            }),
            rendered_via: None,
        },
        (Some("SvgSelector"), Some(value)) => Target {
            source,
            selector: Some(Selector::Svg {
                value: canonicalize_svg(value),
            }),
            rendered_via: None,
        },
        _ => Target {
            source,
            selector: Some(Selector::Other(selector.clone())),
            rendered_via: None,
        },
    }
}

/// Injects the `pixel:` unit into unitless `xywh=` fragments.
fn with_pixel_unit(value: &str) -> String {
    match value.strip_prefix("xywh=") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
            format!("xywh=pixel:{rest}")
        }
        _ => value.to_string(),
    }
}

fn number_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(number)) => match number.as_u64() {
            Some(whole) => whole.to_string(),
            None => number.to_string(),
        },
        Some(Value::String(text)) => text.trim().to_string(),
        _ => "0".to_string(),
    }
}

/// Canonicalizes SVG selector markup.
///
/// `<g>` wrappers are removed, the `<svg>` root loses its attributes, and
/// comma separators inside `<path d="...">` become spaces. Idempotent.
pub fn canonicalize_svg(svg: &str) -> String {
    let without_groups = SVG_GROUP_TAG.replace_all(svg, "");
    let bare_root = SVG_ROOT_TAG.replace_all(&without_groups, "<svg${1}>");
    PATH_TAG
        .replace_all(&bare_root, |path: &Captures| {
            PATH_D_ATTR
                .replace_all(&path[0], |attr: &Captures| {
                    format!("{}{}", &attr[1], attr[2].replace(',', " "))
                })
                .into_owned()
        })
        .into_owned()
}
