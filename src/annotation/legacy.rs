//! The plain-text annotation convention.
//!
//! Older annotation data encodes fields inside `TextualBody` values as
//! `Label: value`. The first colon splits the label from the value and the
//! value may span several lines. Recognized labels:
//!
//! - `Title`, `Description`, `Note`, `Attribution`, `Date`, `Line Color`,
//!   `Line Weight`: the trimmed value.
//! - `Link`: `[text](url)`, or a bare value used as both text and URL.
//! - `Tag`: one `Name: value` pair per line, where `Tag` and `Vocabulary`
//!   are links and `Data` is a JSON object merged into the tag data.
//!
//! Anything else is a `Comment`, except unlabelled tagging bodies, which
//! become a tag with a generated term id.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::model::{LegacyFields, LegacyValue, TagValue, NO_LANGUAGE};
use crate::resource::{as_items, ResourceParser};

static LABELLED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([^:]+):(.*)$").unwrap());

static LABELLED_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:]+):(.*)$").unwrap());

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[(.*)\]\((.*)\)$").unwrap());

/// Labels whose value is kept as trimmed text.
pub const TEXT_LABELS: [&str; 7] = [
    "Title",
    "Description",
    "Note",
    "Attribution",
    "Date",
    "Line Color",
    "Line Weight",
];

pub const COMMENT_LABEL: &str = "Comment";
pub const LINK_LABEL: &str = "Link";
pub const TAG_LABEL: &str = "Tag";

/// Decodes one body value into a pseudo-field label and its value.
///
/// `purpose` is the body purpose, or the annotation motivation when the
/// body declares none.
pub fn parse_annotation_value(value: &str, purpose: Option<&str>) -> (String, LegacyValue) {
    if let Some(captures) = LABELLED_VALUE.captures(value) {
        let (_, [label, rest]) = captures.extract();
        let label = label.trim();
        if TEXT_LABELS.contains(&label) {
            return (label.to_string(), LegacyValue::Text(rest.trim().to_string()));
        }
        match label {
            LINK_LABEL => {
                let (text, url) = parse_link(rest.trim());
                return (LINK_LABEL.to_string(), LegacyValue::Link { text, url });
            }
            TAG_LABEL => return (TAG_LABEL.to_string(), LegacyValue::Tag(parse_tag_lines(value))),
            _ => {}
        }
    } else if purpose == Some("tagging") {
        let tag = TagValue {
            term_id: Some(Uuid::new_v4().to_string()),
            term_label: Some(value.to_string()),
            ..TagValue::default()
        };
        return (TAG_LABEL.to_string(), LegacyValue::Tag(tag));
    }

    (
        COMMENT_LABEL.to_string(),
        LegacyValue::Comment {
            value: value.to_string(),
            format: None,
        },
    )
}

/// Splits `[text](url)`; anything else is used as both text and URL.
pub fn parse_link(value: &str) -> (String, String) {
    match MARKDOWN_LINK.captures(value) {
        Some(captures) => {
            let (_, [text, url]) = captures.extract();
            (text.to_string(), url.to_string())
        }
        None => (value.to_string(), value.to_string()),
    }
}

fn parse_tag_lines(value: &str) -> TagValue {
    let mut tag = TagValue::default();
    for line in value.split('\n') {
        let Some(captures) = LABELLED_LINE.captures(line) else {
            continue;
        };
        let (_, [name, content]) = captures.extract();
        let content = content.trim();
        match name.trim() {
            "Tag" => {
                let (label, id) = parse_link(content);
                tag.term_id = Some(id);
                tag.term_label = Some(label);
            }
            "Vocabulary" => {
                let (name, id) = parse_link(content);
                tag.vocabulary_id = Some(id);
                tag.vocabulary_name = Some(name);
            }
            "Data" => match serde_json::from_str::<Value>(content) {
                Ok(Value::Object(payload)) => {
                    tag.data.get_or_insert_with(Default::default).extend(payload);
                }
                Ok(other) => warn!("Ignoring tag data that is not a JSON object: {other}"),
                Err(err) => warn!("Ignoring malformed tag data {content:?}: {err}"),
            },
            _ => {}
        }
    }
    tag
}

/// Decodes every `TextualBody` of an annotation body with the plain-text
/// convention, grouped by label then language.
pub fn legacy_fields(body: &Value, motivation: Option<&str>) -> LegacyFields {
    let mut fields = LegacyFields::default();
    for item in as_items(body) {
        let parser = ResourceParser::new(item);
        if parser.resource_type() != Some("TextualBody") {
            continue;
        }
        let Some(text) = parser.get_str("value") else {
            continue;
        };
        let purpose = parser.get_str("purpose").or(motivation);
        let lang = parser.get_str("language").unwrap_or(NO_LANGUAGE);

        let (label, mut value) = parse_annotation_value(text, purpose);
        if let LegacyValue::Comment { format, .. } = &mut value {
            *format = parser.get_str("format").map(str::to_string);
        }
        fields.push(&label, lang, value);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognized_text_labels_are_trimmed() {
        assert_eq!(
            parse_annotation_value("Title: Sunset", None),
            ("Title".to_string(), LegacyValue::Text("Sunset".to_string()))
        );
        assert_eq!(
            parse_annotation_value("Line Weight:  thick \n", None),
            ("Line Weight".to_string(), LegacyValue::Text("thick".to_string()))
        );
    }

    #[test]
    fn values_may_span_lines() {
        let (label, value) = parse_annotation_value("Description: first\nsecond", None);
        assert_eq!(label, "Description");
        assert_eq!(value, LegacyValue::Text("first\nsecond".to_string()));
    }

    #[test]
    fn links_parse_markdown_or_fall_back() {
        assert_eq!(
            parse_annotation_value("Link: [Museum](https://museum.example)", None).1,
            LegacyValue::Link {
                text: "Museum".to_string(),
                url: "https://museum.example".to_string()
            }
        );
        assert_eq!(
            parse_link("https://bare.example"),
            (
                "https://bare.example".to_string(),
                "https://bare.example".to_string()
            )
        );
    }

    #[test]
    fn tag_blocks_read_each_line() {
        let body = "Tag: [Painting](https://terms.example/1)\nVocabulary: [Subjects](https://vocab.example)\nData: {\"weight\": 2}";
        let (label, value) = parse_annotation_value(body, None);
        assert_eq!(label, "Tag");
        let LegacyValue::Tag(tag) = value else {
            panic!("expected tag, got {value:?}");
        };
        assert_eq!(tag.term_id.as_deref(), Some("https://terms.example/1"));
        assert_eq!(tag.term_label.as_deref(), Some("Painting"));
        assert_eq!(tag.vocabulary_id.as_deref(), Some("https://vocab.example"));
        assert_eq!(tag.vocabulary_name.as_deref(), Some("Subjects"));
        assert_eq!(tag.data.unwrap().get("weight"), Some(&json!(2)));
    }

    #[test]
    fn malformed_tag_data_is_skipped() {
        let (_, value) = parse_annotation_value("Tag: [A](https://t/a)\nData: {not json", None);
        let LegacyValue::Tag(tag) = value else {
            panic!("expected tag");
        };
        assert_eq!(tag.term_label.as_deref(), Some("A"));
        assert!(tag.data.is_none());
    }

    #[test]
    fn unlabelled_tagging_body_gets_generated_id() {
        let (label, value) = parse_annotation_value("sunset", Some("tagging"));
        assert_eq!(label, "Tag");
        let LegacyValue::Tag(tag) = value else {
            panic!("expected tag");
        };
        assert_eq!(tag.term_label.as_deref(), Some("sunset"));
        let id = tag.term_id.expect("generated id");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn unknown_labels_and_plain_text_are_comments() {
        for text in ["Just a remark", "Remark: with a colon"] {
            assert_eq!(
                parse_annotation_value(text, Some("commenting")),
                (
                    "Comment".to_string(),
                    LegacyValue::Comment {
                        value: text.to_string(),
                        format: None
                    }
                )
            );
        }
    }

    #[test]
    fn legacy_fields_group_by_label_and_language() {
        let body = json!([
            {"type": "TextualBody", "value": "Title: Sunset", "language": "en"},
            {"type": "TextualBody", "value": "Title: Coucher", "language": "fr"},
            {"type": "TextualBody", "value": "<p>Nice</p>", "format": "text/html"},
            {"type": "Image", "id": "https://x/img.png"}
        ]);
        let fields = legacy_fields(&body, Some("commenting"));
        assert_eq!(fields.labels().collect::<Vec<_>>(), vec!["Title", "Comment"]);
        let titles = fields.get("Title").unwrap();
        assert_eq!(titles.languages().collect::<Vec<_>>(), vec!["en", "fr"]);
        assert_eq!(
            fields.get("Comment").unwrap().get("none"),
            Some(
                &[LegacyValue::Comment {
                    value: "<p>Nice</p>".to_string(),
                    format: Some("text/html".to_string())
                }][..]
            )
        );
    }
}
