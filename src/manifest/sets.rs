//! Annotation set grouping.
//!
//! Annotations are grouped by the `AnnotationCollection` their page is
//! `partOf`. Pages without one fall back to the deprecated `Identifier`
//! metadata entry, then to the page's own `id`.

use serde_json::Value;

use crate::model::AnnotationSet;
use crate::resource::{first_of, ResourceParser};

const ANNOTATION_COLLECTION: &str = "AnnotationCollection";

/// The collection a page is part of, when it is an `AnnotationCollection`.
pub fn part_of_collection(page: &Value) -> Option<ResourceParser<'_>> {
    let collection = ResourceParser::new(first_of(page.get("partOf")?)?);
    (collection.resource_type() == Some(ANNOTATION_COLLECTION) && collection.id().is_some())
        .then_some(collection)
}

/// The group key of an annotation page.
pub fn group_key(page: &Value) -> Option<String> {
    if let Some(id) = part_of_collection(page).and_then(|collection| collection.id()) {
        return Some(id.to_string());
    }
    let parser = ResourceParser::new(page);
    parser
        .metadata_text("Identifier")
        .or_else(|| parser.id().map(str::to_string))
}

/// Describes the set an annotation page belongs to.
pub fn annotation_set(page: &Value, pref_lang: Option<&str>) -> Option<AnnotationSet> {
    let id = group_key(page)?;
    let page_parser = ResourceParser::new(page);
    let collection = part_of_collection(page);

    let label = collection
        .and_then(|collection| collection.label(pref_lang))
        .or_else(|| page_parser.label(pref_lang));
    let description = collection
        .and_then(|collection| collection.summary(pref_lang))
        .or_else(|| page_parser.summary(pref_lang));
    let creator = collection
        .and_then(|collection| creator_name(&collection, pref_lang))
        .or_else(|| page_parser.metadata_text("Creator"));

    Some(AnnotationSet {
        id,
        label,
        description,
        creator,
    })
}

/// Reads a W3C `creator`: a name string, or an agent with `name` or `label`.
fn creator_name(collection: &ResourceParser<'_>, pref_lang: Option<&str>) -> Option<String> {
    let named = collection.get("creator").and_then(|creator| {
        match first_of(creator).unwrap_or(creator) {
            Value::String(name) => Some(name.clone()),
            agent => {
                let agent = ResourceParser::new(agent);
                agent
                    .get_str("name")
                    .map(str::to_string)
                    .or_else(|| agent.label(pref_lang))
            }
        }
    });
    named.or_else(|| collection.metadata_text("Creator"))
}
