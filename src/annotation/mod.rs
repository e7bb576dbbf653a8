//! Annotation decoding.
//!
//! [`AnnotationParser`] turns one W3C annotation into display content:
//!
//! - Template-bound annotations (a `generator` URI registered in the
//!   [`TemplateRegistry`]) match each body item to a template field through
//!   the item's own `generator`.
//! - Other textual bodies are generic values; tagging bodies become tags.
//! - [`legacy`] decodes the older `Label: value` plain-text convention.
//! - [`target`] normalizes targets and selectors.

pub mod body;
pub mod legacy;
pub mod target;

use std::ops::Deref;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use self::body::ParsedBody;
use crate::model::{ContentBlock, LegacyFields, LocalizedText, Target};
use crate::resource::{as_items, ResourceParser};
use crate::template::{FieldDefinition, StructureItem, Template, TemplateRegistry};

static TITLE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^\}]+)\}").unwrap());

const LINE_COLOR_PREFIX: &str = "line-color-";
const LINE_WEIGHT_PREFIX: &str = "line-weight-";

/// A parser over one `Annotation` node.
#[derive(Clone, Copy, Debug)]
pub struct AnnotationParser<'a> {
    base: ResourceParser<'a>,
    template: Option<&'a Template>,
}

impl<'a> AnnotationParser<'a> {
    /// Binds the annotation to its template when the registry has it.
    pub fn new(data: &'a Value, templates: &'a TemplateRegistry) -> Self {
        let base = ResourceParser::new(data);
        let template = base
            .get_str("generator")
            .and_then(|generator| templates.get_template(generator));
        Self { base, template }
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    pub fn template(&self) -> Option<&'a Template> {
        self.template
    }

    pub fn template_name(&self) -> Option<&'a str> {
        self.template.and_then(|template| template.name.as_deref())
    }

    pub fn find_field_definition(&self, id: &str) -> Option<&'a FieldDefinition> {
        self.template.and_then(|template| template.field(id))
    }

    pub fn find_field_definition_by_label(&self, label: &str) -> Option<&'a FieldDefinition> {
        self.template.and_then(|template| template.field_by_name(label))
    }

    /// The motivation; the first one when several are listed.
    pub fn motivation(&self) -> Option<&'a str> {
        match self.get("motivation")? {
            Value::String(motivation) => Some(motivation.as_str()),
            Value::Array(motivations) => motivations.first().and_then(Value::as_str),
            _ => None,
        }
    }

    fn is_tagging(&self) -> bool {
        self.motivation()
            .is_some_and(|motivation| motivation.eq_ignore_ascii_case("tagging"))
    }

    pub fn target(&self) -> Option<Target> {
        self.get("target").and_then(target::normalize_target)
    }

    /// Line color from a `line-color-<hex>` style class, as `#<hex>`.
    pub fn line_color(&self) -> Option<String> {
        self.style_value(LINE_COLOR_PREFIX)
            .map(|hex| format!("#{hex}"))
    }

    /// Line weight from a `line-weight-<name>` style class.
    pub fn line_weight(&self) -> Option<String> {
        self.style_value(LINE_WEIGHT_PREFIX).map(str::to_string)
    }

    fn style_value(&self, prefix: &str) -> Option<&'a str> {
        let classes = self.get("target")?.get("styleClass")?;
        as_items(classes)
            .filter_map(Value::as_str)
            .flat_map(str::split_whitespace)
            .find_map(|class| class.strip_prefix(prefix))
    }

    pub fn parse_body(&self) -> ParsedBody {
        match self.get("body") {
            Some(body) => body::parse_body(body, self.is_tagging(), self.template),
            None => ParsedBody::default(),
        }
    }

    /// Body values decoded with the plain-text convention.
    pub fn legacy_fields(&self) -> LegacyFields {
        match self.get("body") {
            Some(body) => legacy::legacy_fields(body, self.motivation()),
            None => LegacyFields::default(),
        }
    }

    /// Language codes declared by body items, first-seen order.
    pub fn language_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        if let Some(body) = self.get("body") {
            for item in as_items(body) {
                if let Some(code) = item.get("language").and_then(Value::as_str) {
                    if !codes.iter().any(|known| known == code) {
                        codes.push(code.to_string());
                    }
                }
            }
        }
        codes
    }

    /// Content blocks in display order.
    ///
    /// With a template `structure`, fields follow it (tab groups become
    /// [`ContentBlock::Tab`], fields without values keep a `None` slot);
    /// otherwise fields come in body order. Generic values follow the fields
    /// and tags always come last.
    pub fn content(&self) -> Vec<ContentBlock> {
        let ParsedBody {
            fields,
            generic,
            tags,
        } = self.parse_body();
        let mut content = Vec::new();

        match self.template.and_then(Template::structure) {
            Some(structure) => {
                let field_block = |item: &StructureItem| {
                    let id = item.id.as_deref().unwrap_or_default();
                    match fields.iter().find(|(field, _)| field.id == id) {
                        Some((field, values)) => ContentBlock::Field {
                            field: Some(field.clone()),
                            values: Some(values.clone()),
                        },
                        None => ContentBlock::Field {
                            field: self.find_field_definition(id).cloned(),
                            values: None,
                        },
                    }
                };
                for item in structure {
                    if item.is_tab_group() {
                        content.push(ContentBlock::Tab {
                            label: item.name.clone(),
                            items: item.item_list_element.iter().map(&field_block).collect(),
                        });
                    } else {
                        content.push(field_block(item));
                    }
                }
            }
            None => {
                content.extend(fields.into_iter().map(|(field, values)| ContentBlock::Field {
                    field: Some(field),
                    values: Some(values),
                }));
            }
        }

        if !generic.is_empty() {
            content.push(ContentBlock::Generic { values: generic });
        }
        if !tags.is_empty() {
            content.push(ContentBlock::Tag { values: tags });
        }
        content
    }

    /// The title built from the template `titleMask`.
    ///
    /// Each `{Field Name}` placeholder takes the field's first value in each
    /// language; placeholders of fields without a value in that language are
    /// removed. When no field has any value the result is the mask under
    /// `en`, with those placeholders removed. Placeholders that name no
    /// template field are left as they are.
    pub fn title(&self) -> Option<LocalizedText> {
        let mask = self.template?.title_mask()?;
        let body = self.parse_body();
        let field_values = |label: &str| {
            self.find_field_definition_by_label(label)
                .map(|field| body.field_values(&field.id))
        };

        let mut languages: Vec<&str> = Vec::new();
        for captures in TITLE_PLACEHOLDER.captures_iter(mask) {
            if let Some(Some(values)) = field_values(&captures[1]) {
                for lang in values.languages() {
                    if !languages.contains(&lang) {
                        languages.push(lang);
                    }
                }
            }
        }

        let render = |lang: Option<&str>| -> String {
            TITLE_PLACEHOLDER
                .replace_all(mask, |captures: &Captures| match field_values(&captures[1]) {
                    None => captures[0].to_string(),
                    Some(values) => lang
                        .zip(values)
                        .and_then(|(lang, values)| values.get(lang))
                        .and_then(|values| values.first())
                        .map(|value| value.display_text().to_string())
                        .unwrap_or_default(),
                })
                .into_owned()
        };

        let mut title = LocalizedText::new();
        for lang in languages.iter().copied() {
            title.set(lang, render(Some(lang)));
        }
        if title.is_empty() {
            title.set("en", render(None));
        }
        Some(title)
    }
}

impl<'a> Deref for AnnotationParser<'a> {
    type Target = ResourceParser<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, LegacyValue, Selector};
    use serde_json::json;

    const TEMPLATE_ID: &str = "https://templates.example/object";

    fn registry() -> TemplateRegistry {
        let template: Template = serde_json::from_value(json!({
            "id": TEMPLATE_ID,
            "name": "Object",
            "definedField": [
                {"id": "f:title", "name": "Title"},
                {"id": "f:maker", "name": "Maker"},
                {"id": "f:source", "name": "Source", "format": "link"},
                {"id": "f:notes", "name": "Notes", "allowHtml": true}
            ],
            "settings": {
                "titleMask": "{Title} by {Maker} ({Unknown})",
                "structure": [
                    {"id": "f:title"},
                    {"id": "f:maker"},
                    {"type": "ItemList", "name": "More", "itemListElement": [{"id": "f:source"}, {"id": "f:notes"}]}
                ]
            }
        }))
        .expect("template");
        let mut registry = TemplateRegistry::new();
        registry.add_template(template);
        registry
    }

    fn field_body(generator: &str, lang: &str, value: &str) -> Value {
        json!({
            "type": "TextualBody",
            "generator": generator,
            "language": lang,
            "format": "text/html",
            "value": format!(r#"<div class="field-value">{value}</div>"#)
        })
    }

    fn templated_annotation() -> Value {
        json!({
            "id": "https://x/anno/1",
            "type": "Annotation",
            "generator": TEMPLATE_ID,
            "motivation": "commenting",
            "body": [
                field_body("f:title", "en", "Vase"),
                field_body("f:title", "fr", "Vase bleu"),
                field_body("f:maker", "en", "Anon."),
                {"type": "TextualBody", "value": "loose note"},
                {"type": "TextualBody", "purpose": "tagging", "value": "ceramics"}
            ],
            "target": {
                "type": "SpecificResource",
                "source": "https://x/canvas/1",
                "selector": {"type": "FragmentSelector", "value": "xywh=1,2,3,4"},
                "styleClass": ["line-color-ff0000", "line-weight-thick"]
            }
        })
    }

    #[test]
    fn binds_template_by_generator() {
        let registry = registry();
        let data = templated_annotation();
        let parser = AnnotationParser::new(&data, &registry);
        assert!(parser.has_template());
        assert_eq!(parser.template_name(), Some("Object"));
        assert_eq!(
            parser.find_field_definition_by_label("Maker").map(|f| f.id.as_str()),
            Some("f:maker")
        );

        let empty = TemplateRegistry::new();
        assert!(!AnnotationParser::new(&data, &empty).has_template());
    }

    #[test]
    fn content_follows_structure_then_generic_then_tags() {
        let registry = registry();
        let data = templated_annotation();
        let content = AnnotationParser::new(&data, &registry).content();

        assert_eq!(content.len(), 5);
        match &content[0] {
            ContentBlock::Field { field, values } => {
                assert_eq!(field.as_ref().map(|f| f.id.as_str()), Some("f:title"));
                let values = values.as_ref().expect("values");
                assert_eq!(values.languages().collect::<Vec<_>>(), vec!["en", "fr"]);
            }
            other => panic!("expected field, got {other:?}"),
        }
        match &content[2] {
            ContentBlock::Tab { label, items } => {
                assert_eq!(label.as_deref(), Some("More"));
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[0], ContentBlock::Field { values: None, .. }));
            }
            other => panic!("expected tab, got {other:?}"),
        }
        assert!(matches!(&content[3], ContentBlock::Generic { .. }));
        assert!(matches!(&content[4], ContentBlock::Tag { .. }));
    }

    #[test]
    fn untemplated_content_puts_tags_last() {
        let data = json!({
            "type": "Annotation",
            "motivation": "commenting",
            "body": [
                {"type": "TextualBody", "purpose": "tagging", "value": "first"},
                {"type": "TextualBody", "value": "<p>Hi</p>", "format": "text/html", "language": "en"}
            ]
        });
        let registry = TemplateRegistry::new();
        let content = AnnotationParser::new(&data, &registry).content();
        assert_eq!(content.len(), 2);
        match &content[0] {
            ContentBlock::Generic { values } => {
                assert_eq!(values.get("en"), Some(&[FieldValue::html("<p>Hi</p>")][..]));
            }
            other => panic!("expected generic, got {other:?}"),
        }
        assert!(matches!(&content[1], ContentBlock::Tag { .. }));
    }

    #[test]
    fn title_substitutes_per_language() {
        let registry = registry();
        let data = templated_annotation();
        let title = AnnotationParser::new(&data, &registry).title().expect("title");
        assert_eq!(title.get("en"), Some("Vase by Anon. ({Unknown})"));
        assert_eq!(title.get("fr"), Some("Vase bleu by  ({Unknown})"));
    }

    #[test]
    fn title_without_values_falls_back_to_english_mask() {
        let registry = registry();
        let data = json!({"type": "Annotation", "generator": TEMPLATE_ID, "body": []});
        let title = AnnotationParser::new(&data, &registry).title().expect("title");
        assert_eq!(title.iter().collect::<Vec<_>>(), vec![("en", " by  ({Unknown})")]);
    }

    #[test]
    fn title_requires_template_mask() {
        let registry = TemplateRegistry::new();
        let data = templated_annotation();
        assert_eq!(AnnotationParser::new(&data, &registry).title(), None);
    }

    #[test]
    fn style_and_target() {
        let registry = registry();
        let data = templated_annotation();
        let parser = AnnotationParser::new(&data, &registry);
        assert_eq!(parser.line_color().as_deref(), Some("#ff0000"));
        assert_eq!(parser.line_weight().as_deref(), Some("thick"));
        let target = parser.target().expect("target");
        assert_eq!(
            target.selector,
            Some(Selector::Fragment {
                value: "xywh=pixel:1,2,3,4".to_string()
            })
        );
    }

    #[test]
    fn style_class_may_be_a_string() {
        let data = json!({"target": {"styleClass": "line-weight-thin line-color-00ff00"}});
        let registry = TemplateRegistry::new();
        let parser = AnnotationParser::new(&data, &registry);
        assert_eq!(parser.line_color().as_deref(), Some("#00ff00"));
        assert_eq!(parser.line_weight().as_deref(), Some("thin"));
    }

    #[test]
    fn missing_style_reads_as_none() {
        let data = json!({"target": "https://x/canvas/1"});
        let registry = TemplateRegistry::new();
        let parser = AnnotationParser::new(&data, &registry);
        assert_eq!(parser.line_color(), None);
        assert_eq!(parser.line_weight(), None);
    }

    #[test]
    fn language_codes_and_legacy_fields() {
        let data = json!({
            "type": "Annotation",
            "motivation": ["commenting", "describing"],
            "body": [
                {"type": "TextualBody", "value": "Title: Sunset", "language": "en"},
                {"type": "TextualBody", "value": "Note: Soir", "language": "fr"},
                {"type": "TextualBody", "value": "Note: Evening", "language": "en"}
            ]
        });
        let registry = TemplateRegistry::new();
        let parser = AnnotationParser::new(&data, &registry);
        assert_eq!(parser.motivation(), Some("commenting"));
        assert_eq!(parser.language_codes(), vec!["en", "fr"]);
        let fields = parser.legacy_fields();
        assert_eq!(
            fields.get("Title").and_then(|values| values.get("en")),
            Some(&[LegacyValue::Text("Sunset".to_string())][..])
        );
    }
}
