use serde_json::Value;

use super::{
    AgentParser, AudioParser, CollectionParser, ImageParser, ResourceParser,
    SpecificResourceParser, VideoParser,
};
use crate::manifest::ManifestParser;

/// A resource node paired with the parser for its declared `type`.
#[derive(Clone, Copy, Debug)]
pub enum Resource<'a> {
    Manifest(ManifestParser<'a>),
    Collection(CollectionParser<'a>),
    Image(ImageParser<'a>),
    Audio(AudioParser<'a>),
    Video(VideoParser<'a>),
    SpecificResource(SpecificResourceParser<'a>),
    Agent(AgentParser<'a>),
    /// Any other type, with only the shared accessors.
    Generic(ResourceParser<'a>),
}

impl<'a> Resource<'a> {
    /// Dispatches on `type` (or `@type`). Unknown or missing types degrade
    /// to [`Resource::Generic`].
    pub fn create(node: &'a Value) -> Self {
        match ResourceParser::new(node).resource_type() {
            Some("Manifest") => Resource::Manifest(ManifestParser::new(node)),
            Some("Collection") => Resource::Collection(CollectionParser::new(node)),
            Some("Image") => Resource::Image(ImageParser::new(node)),
            Some("Audio" | "Sound") => Resource::Audio(AudioParser::new(node)),
            Some("Video") => Resource::Video(VideoParser::new(node)),
            Some("SpecificResource") => {
                Resource::SpecificResource(SpecificResourceParser::new(node))
            }
            Some("Agent") => Resource::Agent(AgentParser::new(node)),
            _ => Resource::Generic(ResourceParser::new(node)),
        }
    }

    /// The shared accessors, whatever the variant.
    pub fn base(&self) -> &ResourceParser<'a> {
        match self {
            Resource::Manifest(parser) => parser,
            Resource::Collection(parser) => parser,
            Resource::Image(parser) => parser,
            Resource::Audio(parser) => parser,
            Resource::Video(parser) => parser,
            Resource::SpecificResource(parser) => parser,
            Resource::Agent(parser) => parser,
            Resource::Generic(parser) => parser,
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        self.base().id()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Manifest(_) => "Manifest",
            Resource::Collection(_) => "Collection",
            Resource::Image(_) => "Image",
            Resource::Audio(_) => "Audio",
            Resource::Video(_) => "Video",
            Resource::SpecificResource(_) => "SpecificResource",
            Resource::Agent(_) => "Agent",
            Resource::Generic(_) => "Resource",
        }
    }

    pub fn as_manifest(&self) -> Option<&ManifestParser<'a>> {
        match self {
            Resource::Manifest(parser) => Some(parser),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionParser<'a>> {
        match self {
            Resource::Collection(parser) => Some(parser),
            _ => None,
        }
    }
}
