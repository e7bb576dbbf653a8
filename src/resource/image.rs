use std::ops::Deref;

use serde_json::Value;

use super::{first_of, ResourceParser};

const IMAGE_API_2_CONTEXTS: [&str; 2] = [
    "http://iiif.io/api/image/2/context.json",
    "https://iiif.io/api/image/2/context.json",
];

const IMAGE_SERVICE_TYPES: [&str; 2] = ["ImageService2", "ImageService3"];

const LEVEL0_PROFILES: [&str; 3] = [
    "http://iiif.io/api/image/2/level0.json",
    "https://iiif.io/api/image/2/level0.json",
    "level0",
];

/// An `Image` resource, possibly backed by a IIIF Image API service.
#[derive(Clone, Copy, Debug)]
pub struct ImageParser<'a> {
    base: ResourceParser<'a>,
}

impl<'a> ImageParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
        }
    }

    /// The static image URL.
    pub fn url(&self) -> Option<&'a str> {
        self.id()
    }

    pub fn format(&self) -> Option<&'a str> {
        self.get_str("format")
    }

    pub fn width(&self) -> Option<u64> {
        self.get("width").and_then(Value::as_u64)
    }

    pub fn height(&self) -> Option<u64> {
        self.get("height").and_then(Value::as_u64)
    }

    /// The raw `service` property.
    pub fn service(&self) -> Option<&'a Value> {
        self.get("service")
    }

    /// The first declared service, when it is a IIIF image service.
    fn image_service(&self) -> Option<&'a Value> {
        let service = first_of(self.service()?)?;
        let context = service.get("@context").and_then(Value::as_str);
        let declared_type = service
            .get("type")
            .or_else(|| service.get("@type"))
            .and_then(Value::as_str);
        let recognized = context.is_some_and(|context| IMAGE_API_2_CONTEXTS.contains(&context))
            || declared_type.is_some_and(|kind| IMAGE_SERVICE_TYPES.contains(&kind));
        recognized.then_some(service)
    }

    /// The Image API base URL of the image service.
    pub fn iiif_url(&self) -> Option<&'a str> {
        let service = self.image_service()?;
        service
            .get("id")
            .or_else(|| service.get("@id"))
            .and_then(Value::as_str)
    }

    pub fn is_iiif(&self) -> bool {
        self.iiif_url().is_some()
    }

    /// True when the image service only supports compliance level 0.
    pub fn is_level0(&self) -> bool {
        let Some(profile) = self.image_service().and_then(|service| service.get("profile")) else {
            return false;
        };
        let is_level0 = |value: &Value| value.as_str().is_some_and(|p| LEVEL0_PROFILES.contains(&p));
        match profile {
            Value::Array(profiles) => profiles.iter().any(is_level0),
            other => is_level0(other),
        }
    }
}

impl<'a> Deref for ImageParser<'a> {
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
    fn detects_v2_service_by_context() {
        let data = json!({
            "id": "https://example.org/full.jpg",
            "type": "Image",
            "service": [{
                "@context": "http://iiif.io/api/image/2/context.json",
                "@id": "https://iiif.example.org/img1",
                "profile": "http://iiif.io/api/image/2/level2.json"
            }]
        });
        let image = ImageParser::new(&data);
        assert!(image.is_iiif());
        assert_eq!(image.iiif_url(), Some("https://iiif.example.org/img1"));
        assert!(!image.is_level0());
    }

    #[test]
    fn detects_v3_level0_service() {
        let data = json!({
            "id": "https://example.org/full.jpg",
            "type": "Image",
            "service": [{"id": "https://iiif.example.org/img2", "type": "ImageService3", "profile": "level0"}]
        });
        let image = ImageParser::new(&data);
        assert_eq!(image.iiif_url(), Some("https://iiif.example.org/img2"));
        assert!(image.is_level0());
    }

    #[test]
    fn level0_profile_may_be_listed() {
        let data = json!({
            "type": "Image",
            "service": {
                "@id": "https://iiif.example.org/img3",
                "@type": "ImageService2",
                "profile": ["http://iiif.io/api/image/2/level0.json", {"formats": ["png"]}]
            }
        });
        assert!(ImageParser::new(&data).is_level0());
    }

    #[test]
    fn unknown_services_are_not_iiif() {
        let data = json!({
            "id": "https://example.org/plain.png",
            "type": "Image",
            "format": "image/png",
            "width": 640,
            "height": 480,
            "service": [{"id": "https://auth.example.org", "type": "AuthCookieService1"}]
        });
        let image = ImageParser::new(&data);
        assert!(!image.is_iiif());
        assert_eq!(image.url(), Some("https://example.org/plain.png"));
        assert_eq!(image.format(), Some("image/png"));
        assert_eq!((image.width(), image.height()), (Some(640), Some(480)));
    }
}
