//! End-to-end loading: acquisition, version handling, page aggregation and
//! error reporting.

mod common;

use common::{atlas_fetcher, fixture, letters_fetcher, ATLAS_MANIFEST, LETTERS_MANIFEST};
use iiif_ingest::validation::ApiVersion;
use iiif_ingest::{IiifError, LoaderStatus, ManifestLoader, ManifestSource, StaticFetcher};
use serde_json::{json, Value};

fn load(source: impl Into<ManifestSource>, fetcher: &StaticFetcher) -> ManifestLoader {
    let mut loader = ManifestLoader::new(source);
    loader.load(fetcher);
    loader
}

fn page_ids(canvas: &Value) -> Vec<(Option<&str>, bool)> {
    canvas["annotations"]
        .as_array()
        .expect("annotations")
        .iter()
        .map(|page| (page["id"].as_str(), page.get("items").is_some()))
        .collect()
}

#[test]
fn v3_manifest_from_url_resolves_reachable_pages() {
    let fetcher = atlas_fetcher();
    let loader = load(ATLAS_MANIFEST, &fetcher);

    assert_eq!(loader.status(), LoaderStatus::Loaded);
    assert!(loader.errors().is_empty());
    assert_eq!(loader.version(), Some(ApiVersion::V3));
    assert_eq!(
        fetcher.requests(),
        vec![
            ATLAS_MANIFEST.to_string(),
            "https://example.org/iiif/atlas/canvas/1/page/remote-a".to_string(),
            "https://example.org/iiif/atlas/canvas/1/page/remote-b".to_string(),
            "https://example.org/iiif/atlas/canvas/2/page/remote-c".to_string(),
        ]
    );

    let data = loader.data().expect("loaded data");
    assert_eq!(
        page_ids(&data["items"][0]),
        vec![
            (Some("https://example.org/iiif/atlas/canvas/1/page/notes"), true),
            (Some("https://example.org/iiif/atlas/canvas/1/page/remote-a"), true),
            (Some("https://example.org/iiif/atlas/canvas/1/page/remote-b"), false),
        ]
    );
    assert_eq!(
        page_ids(&data["items"][1]),
        vec![(Some("https://example.org/iiif/atlas/canvas/2/page/remote-c"), true)]
    );
}

#[test]
fn failed_page_fetch_keeps_the_stub_and_loads() {
    let fetcher = StaticFetcher::new();
    let loader = load(fixture("manifest_v3.json"), &fetcher);

    assert!(loader.has_loaded());
    assert!(!loader.has_errors());
    assert_eq!(fetcher.requests().len(), 3);
    let data = loader.data().expect("loaded data");
    assert_eq!(
        data["items"][0]["annotations"][2],
        json!({"id": "https://example.org/iiif/atlas/canvas/1/page/remote-b", "type": "AnnotationPage"})
    );
}

#[test]
fn embedded_document_skips_manifest_fetch() {
    let fetcher = atlas_fetcher();
    let loader = load(fixture("manifest_v3.json"), &fetcher);
    assert!(loader.has_loaded());
    assert!(!fetcher.requests().contains(&ATLAS_MANIFEST.to_string()));
}

#[test]
fn v2_manifest_is_converted_and_its_lists_fetched() {
    let fetcher = letters_fetcher();
    let loader = load(LETTERS_MANIFEST, &fetcher);

    assert!(loader.has_loaded(), "errors: {:?}", loader.error_messages());
    assert_eq!(loader.version(), Some(ApiVersion::V2));
    assert_eq!(
        fetcher.requests(),
        vec![
            LETTERS_MANIFEST.to_string(),
            "https://example.org/iiif/letters/list/p1".to_string(),
        ]
    );

    let data = loader.data().expect("loaded data");
    assert_eq!(data["type"], json!("Manifest"));
    assert_eq!(data["id"], json!(LETTERS_MANIFEST));
    assert_eq!(data["label"], json!({"en": ["Letters"], "de": ["Briefe"]}));
    assert_eq!(data["summary"], json!({"none": ["Correspondence, 1850-1870."]}));
    assert_eq!(
        data["start"],
        json!({"id": "https://example.org/iiif/letters/canvas/p2", "type": "Canvas"})
    );

    let painting = &data["items"][0]["items"][0];
    assert_eq!(
        painting["id"],
        json!("https://example.org/iiif/letters/canvas/p1/page/painting")
    );
    assert_eq!(painting["items"][0]["motivation"], json!("painting"));
    assert_eq!(painting["items"][0]["body"]["type"], json!("Image"));

    let page = &data["items"][0]["annotations"][0];
    assert_eq!(page["type"], json!("AnnotationPage"));
    assert_eq!(
        page["partOf"][0]["type"],
        json!("AnnotationCollection")
    );
    let annotation = &page["items"][0];
    assert_eq!(annotation["motivation"], json!("commenting"));
    assert_eq!(
        annotation["body"],
        json!({
            "type": "TextualBody",
            "format": "text/plain",
            "language": "en",
            "value": "Note: Dear Sir,"
        })
    );
}

#[test]
fn collection_root_loads() {
    let loader = load(fixture("collection_v3.json"), &StaticFetcher::new());
    assert!(loader.has_loaded());
    assert!(loader.is_collection());
    let root = loader.parser().expect("parser");
    assert_eq!(root.kind(), "Collection");
    assert_eq!(root.as_collection().map(|c| c.members().len()), Some(2));
}

#[test]
fn unreachable_manifest_is_reported() {
    let loader = load(ATLAS_MANIFEST, &StaticFetcher::new());
    assert_eq!(loader.status(), LoaderStatus::Error);
    assert!(loader.data().is_none());
    assert!(matches!(
        loader.errors(),
        [IiifError::ManifestUnreachable { url, .. }] if url == ATLAS_MANIFEST
    ));
}

#[test]
fn document_errors_carry_user_facing_messages() {
    let cases = [
        (json!({"type": "Manifest"}), "Invalid manifest: missing context"),
        (
            json!({"@context": "http://example.org/other/context.json", "type": "Manifest"}),
            "Invalid manifest: unsupported version http://example.org/other/context.json",
        ),
        (
            json!({"@context": "http://iiif.io/api/presentation/3/context.json", "type": "Canvas"}),
            "Invalid manifest: invalid type Canvas",
        ),
        (
            json!({"@context": "http://iiif.io/api/presentation/3/context.json", "type": "Collection", "items": []}),
            "Invalid manifest: the collection is empty",
        ),
        (json!([1, 2, 3]), "Invalid manifest data"),
    ];
    for (document, message) in cases {
        let loader = load(ManifestSource::Document(document), &StaticFetcher::new());
        assert!(loader.has_errors());
        assert_eq!(loader.error_messages(), vec![message.to_string()]);
    }
}

#[test]
fn context_list_uses_last_entry() {
    let document = json!({
        "@context": [
            "http://www.w3.org/ns/anno.jsonld",
            "http://iiif.io/api/presentation/3/context.json"
        ],
        "type": "Manifest",
        "items": []
    });
    let loader = load(ManifestSource::Document(document), &StaticFetcher::new());
    assert!(loader.has_loaded());
    assert_eq!(loader.version(), Some(ApiVersion::V3));
}

#[test]
fn malformed_v2_structure_fails_conversion() {
    let document = json!({
        "@context": "http://iiif.io/api/presentation/2/context.json",
        "@id": "https://x/manifest",
        "@type": "sc:Manifest",
        "sequences": "not a list"
    });
    let loader = load(ManifestSource::Document(document), &StaticFetcher::new());
    assert!(loader.has_errors());
    let messages = loader.error_messages();
    assert!(
        messages[0].starts_with("Invalid manifest: failed to parse the legacy v2 format"),
        "unexpected message: {}",
        messages[0]
    );
}
