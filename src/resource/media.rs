use std::ops::Deref;

use serde_json::Value;

use super::ResourceParser;

/// A `Sound`/`Audio` resource.
#[derive(Clone, Copy, Debug)]
pub struct AudioParser<'a> {
    base: ResourceParser<'a>,
}

impl<'a> AudioParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            base: ResourceParser::new(data),
        }
    }

    pub fn url(&self) -> Option<&'a str> {
        self.id()
    }

    pub fn format(&self) -> Option<&'a str> {
        self.get_str("format")
    }

    /// Duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.get("duration").and_then(Value::as_f64)
    }
}

impl<'a> Deref for AudioParser<'a> {
    type Target = ResourceParser<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// A `Video` resource: audio accessors plus dimensions.
#[derive(Clone, Copy, Debug)]
pub struct VideoParser<'a> {
    audio: AudioParser<'a>,
}

impl<'a> VideoParser<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            audio: AudioParser::new(data),
        }
    }

    pub fn width(&self) -> Option<u64> {
        self.get("width").and_then(Value::as_u64)
    }

    pub fn height(&self) -> Option<u64> {
        self.get("height").and_then(Value::as_u64)
    }
}

impl<'a> Deref for VideoParser<'a> {
    type Target = AudioParser<'a>;

    fn deref(&self) -> &Self::Target {
        &self.audio
    }
}
