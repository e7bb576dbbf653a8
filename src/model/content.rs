//! Decoded annotation content.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use super::values::LangValues;
use crate::template::FieldDefinition;

/// A value of a template field or a generic body.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text { format: String, value: String },
    Link { text: String, url: String },
}

impl FieldValue {
    pub fn plain(value: impl Into<String>) -> Self {
        FieldValue::Text {
            format: "text/plain".to_string(),
            value: value.into(),
        }
    }

    pub fn html(value: impl Into<String>) -> Self {
        FieldValue::Text {
            format: "text/html".to_string(),
            value: value.into(),
        }
    }

    /// The text used when the value fills a title placeholder.
    pub fn display_text(&self) -> &str {
        match self {
            FieldValue::Text { value, .. } => value,
            FieldValue::Link { text, .. } => text,
        }
    }
}

/// One broader term of a tag's vocabulary trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BroaderTerm {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A vocabulary term reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TagValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<BroaderTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl TagValue {
    /// Attaches an external source link under `data.link`.
    pub fn set_link(&mut self, link: &str) {
        self.data
            .get_or_insert_with(Map::new)
            .insert("link".to_string(), Value::String(link.to_string()));
    }

    pub fn link(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("link"))
            .and_then(Value::as_str)
    }
}

/// A renderable block of annotation content.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// A template field; `values` is `None` when the body has no value for it.
    Field {
        field: Option<FieldDefinition>,
        values: Option<LangValues<FieldValue>>,
    },
    /// Untemplated free text.
    Generic { values: LangValues<FieldValue> },
    Tag { values: LangValues<TagValue> },
    /// A named tab group from the template structure.
    Tab { label: Option<String>, items: Vec<ContentBlock> },
}

/// A value decoded with the plain-text `Label: value` convention.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyValue {
    Text(String),
    Link {
        text: String,
        url: String,
    },
    Tag(TagValue),
    Comment {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

/// Pseudo-field label mapped to its values per language, first-seen order.
///
/// Serializes as a JSON object keyed by label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegacyFields {
    fields: Vec<LegacyField>,
}

#[derive(Clone, Debug, PartialEq)]
struct LegacyField {
    label: String,
    values: LangValues<LegacyValue>,
}

impl LegacyFields {
    pub fn push(&mut self, label: &str, lang: &str, value: LegacyValue) {
        match self.fields.iter_mut().find(|field| field.label == label) {
            Some(field) => field.values.push(lang, value),
            None => {
                let mut values = LangValues::new();
                values.push(lang, value);
                self.fields.push(LegacyField {
                    label: label.to_string(),
                    values,
                });
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&LangValues<LegacyValue>> {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| &field.values)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for LegacyFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.label, &field.values)?;
        }
        map.end()
    }
}
