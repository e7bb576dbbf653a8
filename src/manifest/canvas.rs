//! Painted media and thumbnail resolution for canvases.

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::model::CanvasMedia;
use crate::resource::{as_items, first_of, ImageParser, Resource, ResourceParser};

/// Width of thumbnails derived from an image service.
pub const THUMBNAIL_WIDTH: u32 = 80;

const IMAGE_API_SELECTOR: &str = "ImageApiSelector";

/// Image API request parameters and their defaults.
const IMAGE_API_DEFAULTS: [(&str, &str); 5] = [
    ("region", "full"),
    ("size", "max"),
    ("rotation", "0"),
    ("quality", "default"),
    ("format", "jpg"),
];

/// Resolves the media painted onto a canvas.
///
/// Every annotation with a `painting` motivation (any case) is considered,
/// and the last one that resolves wins.
pub fn canvas_image(canvas: &Value) -> Option<CanvasMedia> {
    let mut media = None;
    for annotation in painting_annotations(canvas) {
        let Some(body) = annotation.get("body").and_then(first_of) else {
            continue;
        };
        if let Some(resolved) = resolve_media(Resource::create(body)) {
            media = Some(resolved);
        }
    }
    media
}

fn painting_annotations(canvas: &Value) -> impl Iterator<Item = &Value> {
    let pages = canvas.get("items").map(as_items).into_iter().flatten();
    pages
        .filter(|page| ResourceParser::new(page).resource_type() == Some("AnnotationPage"))
        .flat_map(|page| page.get("items").map(as_items).into_iter().flatten())
        .filter(|annotation| is_painting(annotation))
}

fn is_painting(annotation: &Value) -> bool {
    let motivation = match annotation.get("motivation") {
        Some(Value::Array(motivations)) => motivations.first(),
        other => other,
    };
    motivation
        .and_then(Value::as_str)
        .is_some_and(|motivation| motivation.eq_ignore_ascii_case("painting"))
}

fn resolve_media(body: Resource<'_>) -> Option<CanvasMedia> {
    match body {
        Resource::Image(image) => image_media(&image),
        Resource::Audio(audio) => Some(CanvasMedia::Audio {
            format: audio.format().map(str::to_string),
            url: decode(audio.url()?),
        }),
        Resource::Video(video) => Some(CanvasMedia::Video {
            format: video.format().map(str::to_string),
            url: decode(video.url()?),
            width: video.width(),
            height: video.height(),
        }),
        Resource::SpecificResource(specific) => {
            let Some(Resource::Image(image)) = specific.source_resource() else {
                return None;
            };
            match specific.selector() {
                Some(selector) if is_image_api_selector(selector) => match image.iiif_url() {
                    Some(service) => Some(CanvasMedia::Image {
                        url: decode(&image_api_url(service, selector)),
                    }),
                    None => image.url().map(|url| CanvasMedia::Image { url: decode(url) }),
                },
                _ => image_media(&image),
            }
        }
        _ => None,
    }
}

fn image_media(image: &ImageParser<'_>) -> Option<CanvasMedia> {
    match image.iiif_url() {
        Some(service) => Some(CanvasMedia::Iiif {
            is_level0: image.is_level0(),
            url: decode(service),
        }),
        None => image.url().map(|url| CanvasMedia::Image { url: decode(url) }),
    }
}

fn is_image_api_selector(selector: &Value) -> bool {
    selector.get("type").and_then(Value::as_str) == Some(IMAGE_API_SELECTOR)
}

/// Builds `{service}/{region}/{size}/{rotation}/{quality}.{format}`,
/// taking each parameter from the selector or its default.
pub fn image_api_url(service: &str, selector: &Value) -> String {
    let [region, size, rotation, quality, format] = IMAGE_API_DEFAULTS.map(|(name, default)| {
        match selector.get(name) {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => default.to_string(),
        }
    });
    let service = service.trim_end_matches('/');
    format!("{service}/{region}/{size}/{rotation}/{quality}.{format}")
}

fn decode(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

/// Resolves a canvas thumbnail URL.
///
/// A declared `Image` thumbnail wins. Otherwise the thumbnail derives from
/// the painted media: a sized request for IIIF images (`full/max` for
/// level-0 services), the URL itself for static images, and nothing for
/// audio or video.
pub fn canvas_thumbnail(canvas: &Value) -> Option<String> {
    let declared = canvas
        .get("thumbnail")
        .and_then(first_of)
        .map(ResourceParser::new)
        .filter(|thumbnail| thumbnail.resource_type() == Some("Image"))
        .and_then(|thumbnail| thumbnail.id());
    if let Some(url) = declared {
        return Some(url.to_string());
    }

    match canvas_image(canvas)? {
        CanvasMedia::Iiif {
            is_level0: true,
            url,
        } => Some(format!("{url}/full/max/0/default.jpg")),
        CanvasMedia::Iiif { url, .. } => Some(format!("{url}/full/{THUMBNAIL_WIDTH},/0/default.jpg")),
        CanvasMedia::Image { url } => Some(url),
        CanvasMedia::Audio { .. } | CanvasMedia::Video { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canvas_with(bodies: &[Value]) -> Value {
        let annotations: Vec<Value> = bodies
            .iter()
            .map(|body| json!({"type": "Annotation", "motivation": "painting", "body": body}))
            .collect();
        json!({
            "id": "https://x/canvas/1",
            "type": "Canvas",
            "items": [{"type": "AnnotationPage", "items": annotations}]
        })
    }

    #[test]
    fn iiif_image_resolves_to_service() {
        let canvas = canvas_with(&[json!({
            "id": "https://x/full.jpg",
            "type": "Image",
            "service": [{"id": "https://iiif.example/image%201", "type": "ImageService3", "profile": "level1"}]
        })]);
        assert_eq!(
            canvas_image(&canvas),
            Some(CanvasMedia::Iiif {
                is_level0: false,
                url: "https://iiif.example/image 1".to_string()
            })
        );
        assert_eq!(
            canvas_thumbnail(&canvas).as_deref(),
            Some("https://iiif.example/image 1/full/80,/0/default.jpg")
        );
    }

    #[test]
    fn level0_thumbnail_uses_full_max() {
        let canvas = canvas_with(&[json!({
            "type": "Image",
            "service": [{"@id": "https://iiif.example/static", "@type": "ImageService2", "profile": "level0"}]
        })]);
        assert_eq!(
            canvas_thumbnail(&canvas).as_deref(),
            Some("https://iiif.example/static/full/max/0/default.jpg")
        );
    }

    #[test]
    fn declared_thumbnail_wins() {
        let mut canvas = canvas_with(&[json!({"id": "https://x/full.jpg", "type": "Image"})]);
        canvas["thumbnail"] = json!([{"id": "https://x/thumb.jpg", "type": "Image"}]);
        assert_eq!(canvas_thumbnail(&canvas).as_deref(), Some("https://x/thumb.jpg"));
    }

    #[test]
    fn last_painting_annotation_wins() {
        let canvas = canvas_with(&[
            json!({"id": "https://x/first.jpg", "type": "Image"}),
            json!({"id": "https://x/second.jpg", "type": "Image"}),
        ]);
        assert_eq!(
            canvas_image(&canvas),
            Some(CanvasMedia::Image {
                url: "https://x/second.jpg".to_string()
            })
        );
    }

    #[test]
    fn painting_motivation_is_case_insensitive() {
        let canvas = json!({
            "type": "Canvas",
            "items": [{"type": "AnnotationPage", "items": [{
                "type": "Annotation",
                "motivation": "Painting",
                "body": [{"id": "https://x/a.jpg", "type": "Image"}]
            }]}]
        });
        assert!(canvas_image(&canvas).is_some());
    }

    #[test]
    fn audio_and_video_have_no_derived_thumbnail() {
        let canvas = canvas_with(&[json!({
            "id": "https://x/clip.mp4",
            "type": "Video",
            "format": "video/mp4",
            "width": 640,
            "height": 360
        })]);
        assert_eq!(
            canvas_image(&canvas),
            Some(CanvasMedia::Video {
                format: Some("video/mp4".to_string()),
                url: "https://x/clip.mp4".to_string(),
                width: Some(640),
                height: Some(360)
            })
        );
        assert_eq!(canvas_thumbnail(&canvas), None);
    }

    #[test]
    fn image_api_selector_merges_defaults() {
        let canvas = canvas_with(&[json!({
            "type": "SpecificResource",
            "source": {
                "id": "https://x/full.jpg",
                "type": "Image",
                "service": [{"id": "https://iiif.example/img", "type": "ImageService2"}]
            },
            "selector": {"type": "ImageApiSelector", "region": "0,0,100,100", "rotation": 90}
        })]);
        assert_eq!(
            canvas_image(&canvas),
            Some(CanvasMedia::Image {
                url: "https://iiif.example/img/0,0,100,100/max/90/default.jpg".to_string()
            })
        );
    }

    #[test]
    fn image_api_selector_without_service_uses_plain_url() {
        let canvas = canvas_with(&[json!({
            "type": "SpecificResource",
            "source": {"id": "https://x/full.jpg", "type": "Image"},
            "selector": {"type": "ImageApiSelector", "size": "200,"}
        })]);
        assert_eq!(
            canvas_image(&canvas),
            Some(CanvasMedia::Image {
                url: "https://x/full.jpg".to_string()
            })
        );
    }

    #[test]
    fn canvas_without_painting_has_no_image() {
        let canvas = json!({"type": "Canvas", "items": []});
        assert_eq!(canvas_image(&canvas), None);
        assert_eq!(canvas_thumbnail(&canvas), None);
    }
}
