use std::ops::Deref;

use serde_json::Value;

use super::{first_of, Resource, ResourceParser};

/// A `SpecificResource`: a source resource narrowed by a selector.
#[derive(Clone, Copy, Debug)]
pub struct SpecificResourceParser<'a> {
    base: ResourceParser<'a>,
}

impl<'a> SpecificResourceParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
        }
    }

    /// The raw `source`, either a URI string or an embedded resource.
    pub fn source(&self) -> Option<&'a Value> {
        self.get("source")
    }

    /// The source URI, whichever form `source` takes.
    pub fn source_id(&self) -> Option<&'a str> {
        match self.source()? {
            Value::String(id) => Some(id.as_str()),
            embedded => ResourceParser::new(embedded).id(),
        }
    }

    /// A parser for an embedded source resource.
    pub fn source_resource(&self) -> Option<Resource<'a>> {
        self.source()
            .filter(|source| source.is_object())
            .map(Resource::create)
    }

    /// The selector; the first one when several are listed.
    pub fn selector(&self) -> Option<&'a Value> {
        first_of(self.get("selector")?)
    }

    pub fn selector_type(&self) -> Option<&'a str> {
        self.selector()
            .and_then(|selector| selector.get("type"))
            .and_then(Value::as_str)
    }
}

impl<'a> Deref for SpecificResourceParser<'a> {
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
    fn source_id_accepts_string_and_object_sources() {
        let by_uri = json!({"type": "SpecificResource", "source": "https://x/canvas1"});
        assert_eq!(
            SpecificResourceParser::new(&by_uri).source_id(),
            Some("https://x/canvas1")
        );

        let embedded = json!({
            "type": "SpecificResource",
            "source": {"id": "https://x/canvas2", "type": "Canvas"},
            "selector": [{"type": "PointSelector", "x": 1, "y": 2}, {"type": "FragmentSelector"}]
        });
        let parser = SpecificResourceParser::new(&embedded);
        assert_eq!(parser.source_id(), Some("https://x/canvas2"));
        assert_eq!(parser.selector_type(), Some("PointSelector"));
        assert!(matches!(parser.source_resource(), Some(Resource::Generic(_))));
    }
}
