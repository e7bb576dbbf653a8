//! Fuzz target for the manifest load pipeline.
//!
//! Arbitrary bytes that parse as JSON are loaded as a manifest document,
//! exercising version detection, v2 conversion and root validation.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_load

#![no_main]

use iiif_ingest::{ManifestLoader, ManifestSource, Resource, StaticFetcher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid OOM on very large inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(document) = serde_json::from_slice(data) else {
        return;
    };

    let mut loader = ManifestLoader::new(ManifestSource::Document(document));
    loader.load(&StaticFetcher::new());

    // Projection must not panic on anything the loader accepted.
    if let Some(Resource::Manifest(manifest)) = loader.parser() {
        let _ = manifest.canvases(None);
        let _ = manifest.annotation_sets(None);
        let _ = manifest.languages();
    }
});
