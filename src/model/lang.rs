//! Language-mapped property values.
//!
//! A IIIF v3 language map is a JSON object from language code (or the
//! sentinel `none`) to a list of strings. Real-world documents also carry
//! bare strings and single-string entries, which are read as if they were
//! wrapped in the canonical shape.

use serde_json::Value;

use crate::languages::language_name;

/// The language code used for values without a declared language.
pub const NO_LANGUAGE: &str = "none";

/// Separator used when joining the values of one language.
pub const VALUE_SEPARATOR: &str = "; ";

/// A borrowed, key-ordered view over one language-mapped property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LangProperty<'a> {
    entries: Vec<(&'a str, Vec<&'a str>)>,
}

impl<'a> LangProperty<'a> {
    /// Reads a property value, tolerating non-canonical shapes.
    ///
    /// Non-string list members are ignored; a value that is neither an
    /// object, a string nor a list of strings yields an empty property.
    pub fn from_value(value: &'a Value) -> Self {
        let entries = match value {
            Value::Object(map) => map
                .iter()
                .map(|(lang, values)| (lang.as_str(), string_list(values)))
                .collect(),
            Value::String(text) => vec![(NO_LANGUAGE, vec![text.as_str()])],
            Value::Array(_) => {
                let values = string_list(value);
                if values.is_empty() {
                    vec![]
                } else {
                    vec![(NO_LANGUAGE, values)]
                }
            }
            _ => vec![],
        };
        Self { entries }
    }

    /// Returns the values stored under a language code.
    pub fn get(&self, lang: &str) -> Option<&[&'a str]> {
        self.entries
            .iter()
            .find(|(code, _)| *code == lang)
            .map(|(_, values)| values.as_slice())
    }

    /// Language codes in document order.
    pub fn languages(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }

    /// Iterates `(language, values)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a str])> + '_ {
        self.entries
            .iter()
            .map(|(code, values)| (*code, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the language whose value list contains `needle`.
    pub fn language_of(&self, needle: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(_, values)| values.iter().any(|value| *value == needle))
            .map(|(code, _)| *code)
    }
}

fn string_list(value: &Value) -> Vec<&str> {
    match value {
        Value::String(text) => vec![text.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => vec![],
    }
}

/// Displays the values of one language, joined with `"; "`.
pub fn display_lang_property(prop: &Value, lang: &str) -> Option<String> {
    LangProperty::from_value(prop)
        .get(lang)
        .map(|values| values.join(VALUE_SEPARATOR))
}

/// Displays every language of a property, one entry per language.
///
/// With `show_lang_name`, each entry is prefixed with `(<Language>) `, using
/// "Unknown Language" for codes without a display name.
pub fn display_lang_property_combined(prop: &Value, show_lang_name: bool) -> Vec<String> {
    LangProperty::from_value(prop)
        .iter()
        .map(|(lang, values)| {
            let joined = values.join(VALUE_SEPARATOR);
            if show_lang_name {
                let name = language_name(lang).unwrap_or("Unknown Language");
                format!("({name}) {joined}")
            } else {
                joined
            }
        })
        .collect()
}

/// Displays a property using the automatic language fallback.
///
/// Candidates are tried in order: `pref_lang` (when given and non-empty),
/// `en`, then `none`. The first candidate with a non-empty display wins.
/// Otherwise the first language key of the map is used, in document order.
/// Returns `None` only when the property has no language entries at all.
pub fn display_lang_property_auto(prop: &Value, pref_lang: Option<&str>) -> Option<String> {
    let property = LangProperty::from_value(prop);

    let mut candidates: Vec<&str> = Vec::with_capacity(3);
    for lang in [pref_lang.unwrap_or(""), "en", NO_LANGUAGE] {
        if !lang.is_empty() && !candidates.contains(&lang) {
            candidates.push(lang);
        }
    }

    for lang in candidates {
        if let Some(values) = property.get(lang) {
            let joined = values.join(VALUE_SEPARATOR);
            if !joined.is_empty() {
                return Some(joined);
            }
        }
    }

    let first = property
        .iter()
        .next()
        .map(|(_, values)| values.join(VALUE_SEPARATOR));
    first
}
