//! Canonical annotation targets.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// `conformsTo` URI of media-fragment selectors.
pub const MEDIA_FRAGS_URI: &str = "http://www.w3.org/TR/media-frags/";

/// A canvas region reference.
///
/// Without a selector the target is the whole canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_via: Option<RenderedVia>,
}

impl Target {
    pub fn whole(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            selector: None,
            rendered_via: None,
        }
    }

    pub fn is_whole_canvas(&self) -> bool {
        self.selector.is_none()
    }
}

/// Marks targets that a renderer should draw specially.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedVia {
    pub name: String,
}

impl RenderedVia {
    pub fn point() -> Self {
        Self {
            name: "point".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// A media fragment, always `xywh=pixel:x,y,w,h` once normalized.
    Fragment { value: String },
    /// Canonical SVG markup.
    Svg { value: String },
    /// A selector kind that is passed through untouched.
    Other(Value),
}

impl Selector {
    pub fn fragment(x: u64, y: u64, w: u64, h: u64) -> Self {
        Selector::Fragment {
            value: format!("xywh=pixel:{x},{y},{w},{h}"),
        }
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selector::Fragment { value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "FragmentSelector")?;
                map.serialize_entry("conformsTo", MEDIA_FRAGS_URI)?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Selector::Svg { value } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "SvgSelector")?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Selector::Other(raw) => raw.serialize(serializer),
        }
    }
}
