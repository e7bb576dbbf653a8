//! Manifest-level projection.
//!
//! [`ManifestParser`] walks a canonical (v3-shaped) manifest and produces
//! the flattened views a viewer renders: canvases with their painted media,
//! thumbnails and annotations, annotation sets, the start canvas, the raw
//! table of contents and the languages used anywhere in the document.

pub mod canvas;
pub mod sets;

use std::ops::Deref;

use serde_json::Value;

use crate::annotation::AnnotationParser;
use crate::languages::language_name;
use crate::model::{AnnotationSet, Canvas, CanvasMedia, LanguageEntry, ParsedAnnotation};
use crate::resource::{as_items, ResourceParser, SpecificResourceParser};
use crate::template::TemplateRegistry;

static NO_TEMPLATES: TemplateRegistry = TemplateRegistry::new();

/// A parser over a `Manifest` node.
#[derive(Clone, Copy, Debug)]
pub struct ManifestParser<'a> {
    base: ResourceParser<'a>,
    templates: &'a TemplateRegistry,
}

impl<'a> ManifestParser<'a> {
    /// A parser without registered annotation templates.
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
            templates: &NO_TEMPLATES,
        }
    }

    /// Uses `templates` when decoding annotations.
    pub fn with_templates(self, templates: &'a TemplateRegistry) -> Self {
        Self { templates, ..self }
    }

    pub fn templates(&self) -> &'a TemplateRegistry {
        self.templates
    }

    fn items_of(&self, key: &str) -> impl Iterator<Item = &'a Value> {
        self.get(key).map(as_items).into_iter().flatten()
    }

    /// Top-level `Canvas` nodes.
    pub fn canvas_nodes(&self) -> impl Iterator<Item = &'a Value> {
        self.items_of("items")
            .filter(|item| ResourceParser::new(item).resource_type() == Some("Canvas"))
    }

    /// Flattened canvases, labels resolved with `pref_lang`.
    pub fn canvases(&self, pref_lang: Option<&str>) -> Vec<Canvas> {
        self.canvas_nodes()
            .map(|node| {
                let parser = ResourceParser::new(node);
                Canvas {
                    id: parser.id().map(str::to_string),
                    label: parser.label(pref_lang),
                    description: parser.summary(pref_lang),
                    image: self.canvas_image(node),
                    thumbnail: self.canvas_thumbnail(node),
                    annotations: self.canvas_annotations(node),
                }
            })
            .collect()
    }

    pub fn canvas_image(&self, canvas: &Value) -> Option<CanvasMedia> {
        canvas::canvas_image(canvas)
    }

    pub fn canvas_thumbnail(&self, canvas: &Value) -> Option<String> {
        canvas::canvas_thumbnail(canvas)
    }

    /// Every annotation on the canvas's annotation pages, in page order.
    pub fn canvas_annotations(&self, canvas: &Value) -> Vec<ParsedAnnotation> {
        let mut annotations = Vec::new();
        for page in annotation_pages(canvas) {
            let group = sets::group_key(page);
            let items = page.get("items").map(as_items).into_iter().flatten();
            for item in items {
                if ResourceParser::new(item).resource_type() != Some("Annotation") {
                    continue;
                }
                let parser = AnnotationParser::new(item, self.templates);
                annotations.push(ParsedAnnotation {
                    id: parser.id().map(str::to_string),
                    target: parser.target(),
                    group: group.clone(),
                    data: parser.legacy_fields(),
                    title: parser.title(),
                    content: parser.content(),
                    line_color: parser.line_color(),
                    line_weight: parser.line_weight(),
                    template_name: parser.template_name().map(str::to_string),
                });
            }
        }
        annotations
    }

    /// One entry per distinct group key, in first-seen order.
    pub fn annotation_sets(&self, pref_lang: Option<&str>) -> Vec<AnnotationSet> {
        let mut found: Vec<AnnotationSet> = Vec::new();
        for canvas in self.canvas_nodes() {
            for page in annotation_pages(canvas) {
                let Some(set) = sets::annotation_set(page, pref_lang) else {
                    continue;
                };
                if !found.iter().any(|known| known.id == set.id) {
                    found.push(set);
                }
            }
        }
        found
    }

    /// Languages used anywhere in the manifest, first-seen order.
    ///
    /// Covers the manifest's own properties, every canvas, every annotation
    /// body and every structure label. Codes without a known language name
    /// (including `none`) are dropped.
    pub fn languages(&self) -> Vec<LanguageEntry> {
        let mut codes: Vec<String> = self.language_codes();
        let mut add = |more: Vec<String>| {
            for code in more {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        };

        for canvas in self.canvas_nodes() {
            add(ResourceParser::new(canvas).language_codes());
            for page in annotation_pages(canvas) {
                for item in page.get("items").map(as_items).into_iter().flatten() {
                    add(AnnotationParser::new(item, self.templates).language_codes());
                }
            }
        }
        self.structure_traverse(|node| {
            if let Some(label) = node.get("label") {
                add(crate::model::LangProperty::from_value(label)
                    .languages()
                    .map(str::to_string)
                    .collect());
            }
        });

        codes
            .into_iter()
            .filter_map(|code| {
                language_name(&code).map(|name| LanguageEntry {
                    code,
                    name: name.to_string(),
                })
            })
            .collect()
    }

    /// The raw table-of-contents ranges.
    pub fn structures(&self) -> &'a [Value] {
        self.get("structures")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Visits every structure node depth-first, parents before children.
    pub fn structure_traverse(&self, mut callback: impl FnMut(&'a Value)) {
        fn walk<'a>(nodes: &'a [Value], callback: &mut dyn FnMut(&'a Value)) {
            for node in nodes {
                callback(node);
                if let Some(children) = node.get("items").and_then(Value::as_array) {
                    walk(children, callback);
                }
            }
        }
        walk(self.structures(), &mut callback);
    }

    /// The canvas id of the declared `start`.
    pub fn start_canvas(&self) -> Option<&'a str> {
        let start = self.get("start")?;
        if let Some(id) = start.as_str() {
            return Some(id);
        }
        let parser = ResourceParser::new(start);
        match parser.resource_type() {
            Some("SpecificResource") => SpecificResourceParser::new(start).source_id(),
            _ => parser.id(),
        }
    }
}

impl<'a> Deref for ManifestParser<'a> {
    type Target = ResourceParser<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

fn annotation_pages(canvas: &Value) -> impl Iterator<Item = &Value> {
    canvas
        .get("annotations")
        .map(as_items)
        .into_iter()
        .flatten()
        .filter(|page| ResourceParser::new(page).resource_type() == Some("AnnotationPage"))
}
