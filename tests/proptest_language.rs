use iiif_ingest::model::lang::display_lang_property_auto;
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_language_entries, language_code_strategy, language_map};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn empty_map_is_the_only_missing_display(
        entries in arb_language_entries(5),
        pref in proptest::option::of(language_code_strategy()),
    ) {
        let map = language_map(&entries);
        let shown = display_lang_property_auto(&map, pref.as_deref());
        prop_assert_eq!(shown.is_none(), entries.is_empty());
    }

    #[test]
    fn preferred_language_wins_when_it_has_text(
        entries in arb_language_entries(5),
        pref in language_code_strategy(),
    ) {
        let map = language_map(&entries);
        let shown = display_lang_property_auto(&map, Some(&pref));
        if let Some((_, values)) = entries.iter().find(|(code, _)| *code == pref) {
            let joined = values.join("; ");
            if !joined.is_empty() {
                prop_assert_eq!(shown, Some(joined));
            }
        }
    }

    #[test]
    fn display_is_one_of_the_languages(
        entries in arb_language_entries(5),
        pref in proptest::option::of(language_code_strategy()),
    ) {
        let map = language_map(&entries);
        if let Some(shown) = display_lang_property_auto(&map, pref.as_deref()) {
            prop_assert!(
                entries.iter().any(|(_, values)| values.join("; ") == shown),
                "{shown:?} is not the display of any language"
            );
        }
    }

    #[test]
    fn without_preferred_english_or_none_first_key_is_used(
        entries in arb_language_entries(5),
    ) {
        let others: Vec<_> = entries
            .into_iter()
            .filter(|(code, _)| code != "en" && code != "none")
            .collect();
        let map = language_map(&others);
        let expected = others.first().map(|(_, values)| values.join("; "));
        prop_assert_eq!(display_lang_property_auto(&map, None), expected);
    }
}
