#![allow(dead_code)]

use std::path::PathBuf;

use iiif_ingest::StaticFetcher;
use serde_json::Value;

pub const ATLAS_MANIFEST: &str = "https://example.org/iiif/atlas/manifest";
pub const LETTERS_MANIFEST: &str = "https://example.org/iiif/letters/manifest";
pub const TEMPLATE_URL: &str = "https://templates.example.org/object";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Value {
    let text = std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|err| panic!("read fixture {name}: {err}"));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("parse fixture {name}: {err}"))
}

/// Serves the atlas manifest and two of its three remote annotation pages;
/// `canvas/1/page/remote-b` is left unreachable.
pub fn atlas_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_document(ATLAS_MANIFEST, fixture("manifest_v3.json"))
        .with_document(
            "https://example.org/iiif/atlas/canvas/1/page/remote-a",
            fixture("annotation_page_v3.json"),
        )
        .with_document(
            "https://example.org/iiif/atlas/canvas/2/page/remote-c",
            fixture("templated_page_v3.json"),
        )
        .with_document(TEMPLATE_URL, fixture("template.json"))
}

pub fn letters_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_document(LETTERS_MANIFEST, fixture("manifest_v2.json"))
        .with_document(
            "https://example.org/iiif/letters/list/p1",
            fixture("annotation_list_v2.json"),
        )
}
