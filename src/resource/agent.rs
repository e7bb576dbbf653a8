use std::ops::Deref;

use serde_json::Value;

use super::ResourceParser;

/// An `Agent`, typically a manifest `provider`.
#[derive(Clone, Copy, Debug)]
pub struct AgentParser<'a> {
    base: ResourceParser<'a>,
}

impl<'a> AgentParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
        }
    }

    /// The logo URL; `width` only applies to IIIF-backed logos.
    pub fn logo(&self, width: u32) -> Option<String> {
        self.image_property_value("logo", width)
    }
}

impl<'a> Deref for AgentParser<'a> {
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
    fn iiif_logo_is_sized() {
        let data = json!({
            "type": "Agent",
            "logo": [{
                "id": "https://example.org/logo/full/max/0/default.png",
                "type": "Image",
                "service": [{"id": "https://iiif.example.org/logo", "type": "ImageService2"}]
            }]
        });
        assert_eq!(
            AgentParser::new(&data).logo(80).as_deref(),
            Some("https://iiif.example.org/logo/full/80,/0/default.jpg")
        );
    }
}
