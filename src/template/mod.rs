//! Annotation templates and the template registry.
//!
//! A template describes the structured fields an annotation body may carry:
//! each field has a URI `id`, a display `name` and a `format`. Annotations
//! opt into a template through their `generator` URI, and each body item
//! names its field through its own `generator`.
//!
//! The registry is an explicit value rather than global state. It is
//! populated through `&mut` methods and read through shared borrows, so all
//! templates must be loaded before any [`AnnotationParser`] borrows it.
//!
//! [`AnnotationParser`]: crate::annotation::AnnotationParser

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IiifError;
use crate::fetch::JsonFetcher;

/// A template document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub defined_field: Vec<FieldDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TemplateSettings>,
}

impl Template {
    /// Finds a field definition by its URI.
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.defined_field.iter().find(|field| field.id == id)
    }

    /// Finds a field definition by its display name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.defined_field
            .iter()
            .find(|field| field.name.as_deref() == Some(name))
    }

    pub fn title_mask(&self) -> Option<&str> {
        self.settings
            .as_ref()
            .and_then(|settings| settings.title_mask.as_deref())
            .filter(|mask| !mask.is_empty())
    }

    pub fn structure(&self) -> Option<&[StructureItem]> {
        self.settings
            .as_ref()
            .map(|settings| settings.structure.as_slice())
            .filter(|structure| !structure.is_empty())
    }
}

/// One field declared by a template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `link` for link fields; anything else is a text field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default)]
    pub allow_html: bool,
}

impl FieldDefinition {
    pub fn is_link(&self) -> bool {
        self.format.as_deref() == Some("link")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_mask: Option<String>,

    /// Rendering order of the fields.
    #[serde(default)]
    pub structure: Vec<StructureItem>,
}

/// An entry of a template `structure`: a field reference, or a named tab
/// group (`type: "ItemList"`) holding field references.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureItem {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_list_element: Vec<StructureItem>,
}

impl StructureItem {
    pub fn is_tab_group(&self) -> bool {
        self.item_type.as_deref() == Some("ItemList")
    }
}

/// Templates keyed by URI.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    pub const fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Fetches a template document and stores it under `url`.
    ///
    /// Failures are logged and reported as `false`; the registry is left
    /// unchanged.
    pub fn load_template(&mut self, fetcher: &dyn JsonFetcher, url: &str) -> bool {
        match self.try_load_template(fetcher, url) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to load template from {url}: {err}");
                false
            }
        }
    }

    /// Fetches a template document and stores it under `url`.
    pub fn try_load_template(
        &mut self,
        fetcher: &dyn JsonFetcher,
        url: &str,
    ) -> Result<(), IiifError> {
        let document = fetcher.fetch_json(url)?;
        let template: Template =
            serde_json::from_value(document).map_err(|source| IiifError::TemplateParse {
                url: url.to_string(),
                source,
            })?;
        debug!(
            "Loaded template {url} with {} field(s)",
            template.defined_field.len()
        );
        self.templates.insert(url.to_string(), Arc::new(template));
        Ok(())
    }

    /// Stores a template under its own `id`.
    pub fn add_template(&mut self, template: Template) {
        self.templates
            .insert(template.id.clone(), Arc::new(template));
    }

    pub fn has_template(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn get_template(&self, id: &str) -> Option<&Template> {
        self.templates.get(id).map(Arc::as_ref)
    }

    /// All templates, ordered by key.
    pub fn all_templates(&self) -> Vec<&Template> {
        self.templates.values().map(Arc::as_ref).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}
