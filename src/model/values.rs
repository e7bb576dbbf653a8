use serde::ser::{Serialize, SerializeMap, Serializer};

/// Multi-valued, multi-language values in first-seen language order.
///
/// Serializes as a JSON object keyed by language code.
#[derive(Clone, Debug, PartialEq)]
pub struct LangValues<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> Default for LangValues<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> LangValues<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under a language, creating the language on first use.
    pub fn push(&mut self, lang: impl Into<String>, value: T) {
        let lang = lang.into();
        match self.entries.iter_mut().find(|(code, _)| *code == lang) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((lang, vec![value])),
        }
    }

    pub fn get(&self, lang: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(code, _)| code == lang)
            .map(|(_, values)| values.as_slice())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(code, values)| (code.as_str(), values.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().flat_map(|(_, values)| values.iter_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Serialize> Serialize for LangValues<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, values) in &self.entries {
            map.serialize_entry(lang, values)?;
        }
        map.end()
    }
}

/// One string per language, in first-seen language order.
///
/// Serializes as a JSON object keyed by language code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalizedText {
    entries: Vec<(String, String)>,
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text for a language, replacing any previous text.
    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        let lang = lang.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(code, _)| *code == lang) {
            Some((_, existing)) => *existing = text,
            None => self.entries.push((lang, text)),
        }
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(code, _)| code == lang)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, text)| (code.as_str(), text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, text) in &self.entries {
            map.serialize_entry(lang, text)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_groups_by_language_in_first_seen_order() {
        let mut values = LangValues::new();
        values.push("fr", 1);
        values.push("en", 2);
        values.push("fr", 3);

        assert_eq!(values.languages().collect::<Vec<_>>(), vec!["fr", "en"]);
        assert_eq!(values.get("fr"), Some(&[1, 3][..]));
        assert_eq!(values.get("de"), None);
    }

    #[test]
    fn serializes_as_object() {
        let mut values = LangValues::new();
        values.push("none", "a");
        values.push("en", "b");
        let json = serde_json::to_string(&values).expect("serialize");
        assert_eq!(json, r#"{"none":["a"],"en":["b"]}"#);
    }
}
