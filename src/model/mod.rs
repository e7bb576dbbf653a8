//! Shared value types: language maps, decoded annotation content, targets
//! and the flattened output records.

pub mod content;
pub mod lang;
pub mod records;
pub mod target;
pub mod values;

pub use content::{BroaderTerm, ContentBlock, FieldValue, LegacyFields, LegacyValue, TagValue};
pub use lang::{LangProperty, NO_LANGUAGE, VALUE_SEPARATOR};
pub use records::{
    AnnotationSet, Canvas, CanvasMedia, LanguageEntry, LinkEntry, MetadataEntry, MetadataValue,
    ParsedAnnotation, RequiredStatement,
};
pub use target::{RenderedVia, Selector, Target, MEDIA_FRAGS_URI};
pub use values::{LangValues, LocalizedText};
