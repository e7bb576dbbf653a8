use std::ops::Deref;

use serde_json::Value;

use super::{Resource, ResourceParser};

/// A `Collection` of manifests and sub-collections. Members are not fetched.
#[derive(Clone, Copy, Debug)]
pub struct CollectionParser<'a> {
    base: ResourceParser<'a>,
}

impl<'a> CollectionParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
        }
    }

    pub fn items(&self) -> &'a [Value] {
        self.get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// A parser per member.
    pub fn members(&self) -> Vec<Resource<'a>> {
        self.items().iter().map(Resource::create).collect()
    }
}

impl<'a> Deref for CollectionParser<'a> {
    type Target = ResourceParser<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn members_are_dispatched_by_type() {
        let data = json!({
            "type": "Collection",
            "items": [
                {"id": "https://x/m1", "type": "Manifest"},
                {"id": "https://x/c1", "type": "Collection"}
            ]
        });
        let collection = CollectionParser::new(&data);
        assert_eq!(collection.items().len(), 2);
        let members = collection.members();
        assert!(matches!(members[0], Resource::Manifest(_)));
        assert!(matches!(members[1], Resource::Collection(_)));
        assert_eq!(members[1].id(), Some("https://x/c1"));
    }

    #[test]
    fn missing_items_read_as_empty() {
        let data = json!({"type": "Collection"});
        assert!(CollectionParser::new(&data).items().is_empty());
    }
}
