use iiif_ingest::annotation::target::canonicalize_svg;
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::path_data_strategy;

fn svg_document(paths: &[String], grouped: bool, width: u32) -> String {
    let body: String = paths
        .iter()
        .map(|d| format!(r#"<path d="{d}" fill="none"/>"#))
        .collect();
    let body = if grouped {
        format!(r#"<g class="layer">{body}</g>"#)
    } else {
        body
    };
    format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}">{body}</svg>"#)
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn canonicalization_is_idempotent(
        paths in proptest::collection::vec(path_data_strategy(), 1..4),
        grouped in any::<bool>(),
        width in 1u32..10_000,
    ) {
        let once = canonicalize_svg(&svg_document(&paths, grouped, width));
        let twice = canonicalize_svg(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn canonical_form_has_bare_root_and_no_groups(
        paths in proptest::collection::vec(path_data_strategy(), 1..4),
        grouped in any::<bool>(),
        width in 1u32..10_000,
    ) {
        let canonical = canonicalize_svg(&svg_document(&paths, grouped, width));
        prop_assert!(canonical.starts_with("<svg>"), "{}", canonical);
        prop_assert!(!canonical.contains("<g"), "{}", canonical);
        prop_assert!(!canonical.contains("</g>"), "{}", canonical);
    }

    #[test]
    fn path_data_loses_commas_only(
        paths in proptest::collection::vec(path_data_strategy(), 1..4),
    ) {
        let canonical = canonicalize_svg(&svg_document(&paths, false, 100));
        for d in &paths {
            let expected = format!(r#"d="{}""#, d.replace(',', " "));
            prop_assert!(canonical.contains(&expected), "{} missing from {}", expected, canonical);
        }
    }

    #[test]
    fn self_closing_root_keeps_its_slash(
        width in 1u32..10_000,
        height in 1u32..10_000,
    ) {
        let svg = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"/>"#);
        prop_assert_eq!(canonicalize_svg(&svg), "<svg/>");
    }
}
