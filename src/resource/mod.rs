//! Parsers over IIIF resource nodes.
//!
//! Every parser is a borrowed view over one JSON node. Accessors never fail:
//! a missing or malformed optional property reads as `None` or as an empty
//! collection.
//!
//! [`ResourceParser`] covers the properties shared by all resources. The
//! typed parsers ([`ImageParser`], [`AudioParser`], [`VideoParser`],
//! [`SpecificResourceParser`], [`AgentParser`], [`CollectionParser`]) add
//! type-specific accessors and dereference to it. [`Resource::create`]
//! picks the right parser for a node from its declared `type`.

mod agent;
mod collection;
mod factory;
mod image;
mod media;
mod specific;

pub use agent::AgentParser;
pub use collection::CollectionParser;
pub use factory::Resource;
pub use image::ImageParser;
pub use media::{AudioParser, VideoParser};
pub use specific::SpecificResourceParser;

use serde_json::Value;

use crate::model::lang::{self, LangProperty};
use crate::model::{LinkEntry, MetadataEntry, MetadataValue, RequiredStatement};

/// Default width used when a logo is requested from an image service.
pub const DEFAULT_LOGO_WIDTH: u32 = 80;

/// Shared accessors of any IIIF resource.
#[derive(Clone, Copy, Debug)]
pub struct ResourceParser<'a> {
    data: &'a Value,
}

impl<'a> ResourceParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data }
    }

    /// The raw node.
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Reads a property; JSON `null` reads as missing.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key).filter(|value| !value.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The resource `id`, or the JSON-LD `@id` of v2-shaped nodes.
    pub fn id(&self) -> Option<&'a str> {
        self.get_str("id").or_else(|| self.get_str("@id"))
    }

    /// The resource `type`, or the JSON-LD `@type` of v2-shaped nodes.
    pub fn resource_type(&self) -> Option<&'a str> {
        self.get_str("type").or_else(|| self.get_str("@type"))
    }

    pub fn label(&self, pref_lang: Option<&str>) -> Option<String> {
        self.get("label")
            .and_then(|label| lang::display_lang_property_auto(label, pref_lang))
    }

    pub fn summary(&self, pref_lang: Option<&str>) -> Option<String> {
        self.get("summary")
            .and_then(|summary| lang::display_lang_property_auto(summary, pref_lang))
    }

    /// The `requiredStatement`, when both its label and value display.
    pub fn required_statement(&self, pref_lang: Option<&str>) -> Option<RequiredStatement> {
        let statement = self.get("requiredStatement")?;
        let label = lang::display_lang_property_auto(statement.get("label")?, pref_lang)?;
        let value = lang::display_lang_property_auto(statement.get("value")?, pref_lang)?;
        Some(RequiredStatement { label, value })
    }

    pub fn rights(&self) -> Option<&'a str> {
        self.get_str("rights")
    }

    /// Every metadata pair, displayed with the language fallback.
    pub fn metadata(&self, pref_lang: Option<&str>) -> Vec<MetadataEntry> {
        self.metadata_items()
            .map(|item| MetadataEntry {
                label: item
                    .get("label")
                    .and_then(|label| lang::display_lang_property_auto(label, pref_lang)),
                value: item
                    .get("value")
                    .and_then(|value| lang::display_lang_property_auto(value, pref_lang)),
            })
            .collect()
    }

    /// Looks up a metadata value by one of its label strings.
    ///
    /// The first entry whose label contains `label` in some language wins.
    /// With `match_language`, the value in that same language is returned and
    /// entries lacking it are skipped; otherwise every language of the value
    /// is returned, prefixed with its language name.
    pub fn metadata_value(&self, label: &str, match_language: bool) -> Option<MetadataValue> {
        for item in self.metadata_items() {
            let Some(item_label) = item.get("label") else {
                continue;
            };
            let Some(lang) = LangProperty::from_value(item_label).language_of(label) else {
                continue;
            };
            let value = item.get("value").unwrap_or(&Value::Null);
            if match_language {
                if let Some(display) = lang::display_lang_property(value, lang) {
                    return Some(MetadataValue::Matched(display));
                }
            } else {
                return Some(MetadataValue::Combined(
                    lang::display_lang_property_combined(value, true),
                ));
            }
        }
        None
    }

    /// Convenience for a language-matched metadata lookup.
    pub fn metadata_text(&self, label: &str) -> Option<String> {
        match self.metadata_value(label, true)? {
            MetadataValue::Matched(text) => Some(text),
            MetadataValue::Combined(_) => None,
        }
    }

    fn metadata_items(&self) -> impl Iterator<Item = &'a Value> {
        self.get("metadata")
            .and_then(Value::as_array)
            .map(|items| items.as_slice())
            .unwrap_or_default()
            .iter()
    }

    pub fn thumbnail(&self, width: u32) -> Option<String> {
        self.image_property_value("thumbnail", width)
    }

    /// Resolves an image-valued property to a URL.
    ///
    /// Only the first element is considered. IIIF-backed images produce an
    /// Image API request `{service}/full/{width},/0/default.jpg`; anything
    /// else yields its literal `id`.
    pub fn image_property_value(&self, property: &str, width: u32) -> Option<String> {
        let first = first_of(self.get(property)?)?;
        match Resource::create(first) {
            Resource::Image(image) => match image.iiif_url() {
                Some(service) => Some(format!("{service}/full/{width},/0/default.jpg")),
                None => image.url().map(str::to_string),
            },
            other => other.id().map(str::to_string),
        }
    }

    pub fn homepage(&self, pref_lang: Option<&str>) -> Vec<LinkEntry> {
        self.links("homepage", pref_lang)
    }

    pub fn see_also(&self, pref_lang: Option<&str>) -> Vec<LinkEntry> {
        self.links("seeAlso", pref_lang)
    }

    pub fn rendering(&self, pref_lang: Option<&str>) -> Vec<LinkEntry> {
        self.links("rendering", pref_lang)
    }

    fn links(&self, property: &str, pref_lang: Option<&str>) -> Vec<LinkEntry> {
        let Some(value) = self.get(property) else {
            return Vec::new();
        };
        as_items(value)
            .filter_map(|item| {
                let parser = ResourceParser::new(item);
                Some(LinkEntry {
                    id: parser.id()?.to_string(),
                    resource_type: parser.resource_type().map(str::to_string),
                    label: parser.label(pref_lang),
                    format: parser.get_str("format").map(str::to_string),
                })
            })
            .collect()
    }

    pub fn providers(&self) -> Vec<AgentParser<'a>> {
        self.get("provider")
            .map(|value| as_items(value).map(AgentParser::new).collect())
            .unwrap_or_default()
    }

    /// Language keys used by the descriptive properties, first-seen order.
    pub fn language_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        let mut add = |value: Option<&Value>| {
            if let Some(value) = value {
                for code in LangProperty::from_value(value).languages() {
                    if !codes.iter().any(|known| known == code) {
                        codes.push(code.to_string());
                    }
                }
            }
        };

        add(self.get("label"));
        add(self.get("summary"));
        for item in self.metadata_items() {
            add(item.get("label"));
            add(item.get("value"));
        }
        if let Some(statement) = self.get("requiredStatement") {
            add(statement.get("label"));
            add(statement.get("value"));
        }
        codes
    }

    pub fn display_lang_property(prop: &Value, lang: &str) -> Option<String> {
        lang::display_lang_property(prop, lang)
    }

    pub fn display_lang_property_combined(prop: &Value, show_lang_name: bool) -> Vec<String> {
        lang::display_lang_property_combined(prop, show_lang_name)
    }

    pub fn display_lang_property_auto(prop: &Value, pref_lang: Option<&str>) -> Option<String> {
        lang::display_lang_property_auto(prop, pref_lang)
    }
}

/// The first element of an array, or the value itself when it is an object.
pub(crate) fn first_of(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(value),
        _ => None,
    }
}

/// Iterates the members of an array-or-singular property.
pub(crate) fn as_items(value: &Value) -> impl Iterator<Item = &Value> {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        Value::Null => &[],
        other => std::slice::from_ref(other),
    };
    items.iter()
}
