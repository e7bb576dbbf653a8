//! Structured decoding of annotation bodies.

use serde_json::Value;
use url::Url;

use crate::html::{detect_html, HtmlFragment};
use crate::model::{BroaderTerm, FieldValue, LangValues, TagValue, NO_LANGUAGE};
use crate::resource::{as_items, ImageParser, ResourceParser, SpecificResourceParser};
use crate::template::{FieldDefinition, Template};

const HTML_FORMAT: &str = "text/html";

/// Values collected from one annotation body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedBody {
    /// Template fields in first-seen order.
    pub fields: Vec<(FieldDefinition, LangValues<FieldValue>)>,
    pub generic: LangValues<FieldValue>,
    pub tags: LangValues<TagValue>,
}

impl ParsedBody {
    pub fn field_values(&self, field_id: &str) -> Option<&LangValues<FieldValue>> {
        self.fields
            .iter()
            .find(|(field, _)| field.id == field_id)
            .map(|(_, values)| values)
    }

    fn push_field(&mut self, field: &FieldDefinition, lang: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(known, _)| known.id == field.id) {
            Some((_, values)) => values.push(lang, value),
            None => {
                let mut values = LangValues::new();
                values.push(lang, value);
                self.fields.push((field.clone(), values));
            }
        }
    }
}

/// Decodes every body item.
///
/// `tagging` is true when the annotation motivation is tagging. `template`
/// is the bound template, if any.
pub fn parse_body(body: &Value, tagging: bool, template: Option<&Template>) -> ParsedBody {
    let mut parsed = ParsedBody::default();
    let mut tag_link: Option<String> = None;

    for item in as_items(body) {
        let parser = ResourceParser::new(item);
        match parser.resource_type() {
            Some("TextualBody") => {
                let lang = parser.get_str("language").unwrap_or(NO_LANGUAGE);
                let purpose_tagging = parser
                    .get_str("purpose")
                    .is_some_and(|purpose| purpose.eq_ignore_ascii_case("tagging"));
                if tagging || purpose_tagging {
                    parsed.tags.push(lang, parse_tag(item));
                    continue;
                }

                // Templated items whose generator names no field are dropped.
                match template.zip(parser.get_str("generator")) {
                    Some((template, generator)) => {
                        if let Some(field) = template.field(generator) {
                            let value = parse_field_value(item, field);
                            parsed.push_field(field, lang, value);
                        }
                    }
                    None => parsed.generic.push(lang, parse_generic_value(item)),
                }
            }
            Some("Image") => {
                if let Some(url) = ImageParser::new(item).url() {
                    parsed.generic.push(
                        NO_LANGUAGE,
                        FieldValue::html(format!(r#"<img src="{url}" alt="Annotation Image">"#)),
                    );
                }
            }
            Some("SpecificResource") if tagging => {
                let source = SpecificResourceParser::new(item).source_id();
                if let Some(source) = source.filter(|source| is_web_url(source)) {
                    tag_link = Some(source.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(link) = tag_link {
        for tag in parsed.tags.iter_mut() {
            tag.set_link(&link);
        }
    }
    parsed
}

fn is_web_url(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn body_text(item: &Value) -> &str {
    item.get("value").and_then(Value::as_str).unwrap_or_default()
}

/// Extracts a template field value from the body's HTML.
pub fn parse_field_value(item: &Value, field: &FieldDefinition) -> FieldValue {
    let raw = body_text(item);
    let fragment = HtmlFragment::parse(raw);

    if field.is_link() {
        return match fragment.select_first(".field-value a") {
            Some(link) => FieldValue::Link {
                text: link.text(),
                url: link.attr("href").unwrap_or_default(),
            },
            None => FieldValue::plain(fragment.text()),
        };
    }

    match (fragment.select_first(".field-value"), field.allow_html) {
        (Some(container), true) => FieldValue::html(container.inner_html()),
        (Some(container), false) => FieldValue::plain(container.text()),
        (None, true) => FieldValue::html(raw),
        (None, false) => FieldValue::plain(fragment.text()),
    }
}

/// An untemplated value, keeping its declared format.
pub fn parse_generic_value(item: &Value) -> FieldValue {
    let text = body_text(item);
    match item.get("format").and_then(Value::as_str) {
        Some(HTML_FORMAT) => FieldValue::html(text),
        _ => FieldValue::plain(text),
    }
}

/// Decodes a tagging body.
///
/// HTML bodies carry the term in a `<span>`: an optional `<a href>` gives
/// the term id and label, `data-vocab-*` attributes the vocabulary, and
/// `data-broader-label-N` / `data-broader-id-N` (N from 1, up to the first
/// gap) the broader-term trace.
pub fn parse_tag(item: &Value) -> TagValue {
    let text = body_text(item);
    let is_html = item.get("format").and_then(Value::as_str) == Some(HTML_FORMAT)
        || detect_html(text);
    if !is_html {
        return TagValue {
            term_label: Some(text.to_string()),
            ..TagValue::default()
        };
    }

    let fragment = HtmlFragment::parse(text);
    let Some(span) = fragment.select_first("span") else {
        return TagValue {
            term_label: Some(fragment.text()),
            ..TagValue::default()
        };
    };

    let mut tag = TagValue::default();
    match span.select_first("a") {
        Some(link) => {
            tag.term_id = link.attr("href");
            tag.term_label = Some(link.text());
        }
        None => tag.term_label = Some(span.text()),
    }
    tag.vocabulary_name = span.attr("data-vocab-label");
    tag.vocabulary_id = span.attr("data-vocab-id");

    let mut index = 1;
    while let Some(label) = span.attr(&format!("data-broader-label-{index}")) {
        tag.trace.push(BroaderTerm {
            label,
            key: span.attr(&format!("data-broader-id-{index}")),
        });
        index += 1;
    }
    tag
}
