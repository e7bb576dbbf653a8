#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{Map, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Language codes, including the `none` key and codes with no known name.
pub fn language_code_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("en".to_string()),
        Just("fr".to_string()),
        Just("de".to_string()),
        Just("none".to_string()),
        proptest::string::string_regex("[a-z]{2,3}").expect("valid code regex"),
    ]
    .boxed()
}

pub fn label_text_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[A-Za-z0-9 ]{0,12}")
        .expect("valid label regex")
        .boxed()
}

/// A language map as ordered `(code, values)` entries with distinct codes.
pub fn arb_language_entries(max_langs: usize) -> BoxedStrategy<Vec<(String, Vec<String>)>> {
    proptest::collection::vec(
        (
            language_code_strategy(),
            proptest::collection::vec(label_text_strategy(), 0..3),
        ),
        0..=max_langs,
    )
    .prop_map(|entries| {
        let mut seen: Vec<String> = Vec::new();
        entries
            .into_iter()
            .filter(|(code, _)| {
                if seen.contains(code) {
                    false
                } else {
                    seen.push(code.clone());
                    true
                }
            })
            .collect()
    })
    .boxed()
}

pub fn language_map(entries: &[(String, Vec<String>)]) -> Value {
    let mut map = Map::new();
    for (code, values) in entries {
        map.insert(
            code.clone(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
    }
    Value::Object(map)
}

/// A comma separated coordinate list such as `1,2 3,4`.
pub fn path_data_strategy() -> BoxedStrategy<String> {
    proptest::collection::vec((0u32..5000, 0u32..5000), 1..6)
        .prop_map(|points| {
            points
                .iter()
                .enumerate()
                .map(|(idx, (x, y))| {
                    let command = if idx == 0 { 'M' } else { 'L' };
                    format!("{command}{x},{y}")
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .boxed()
}
