//! Property-based tests using proptest
//!
//! Random inputs against the sanitizers and the URL gate.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use roomielab_api::{is_safe_url, sanitize_array, sanitize_object, sanitize_string};

const DENYLIST: &[char] = &['<', '>', '"', '\'', '`', '\\', ';', '\0'];

/// Strategy for strings mixing text with markup and metacharacters
fn hostile_string_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-zA-Z0-9 <>\"'`;\\\\/=]{0,200}",
        "[a-z ]{0,20}".prop_map(|s| format!("<script>{}</script>{}", s, s)),
        "[a-z ]{0,20}".prop_map(|s| format!("<b onclick=\"x()\">{}</b>", s)),
    ]
}

/// Strategy for nested JSON values with string leaves
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        hostile_string_strategy().prop_map(Value::String),
    ];
    leaf.prop_recursive(8, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map(hostile_string_strategy(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn strings_and_keys(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| strings_and_keys(v, out)),
        Value::Object(map) => {
            for (key, child) in map {
                out.push(key.clone());
                strings_and_keys(child, out);
            }
        }
        _ => {}
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

proptest! {
    #[test]
    fn prop_sanitized_string_has_no_metacharacters(input in hostile_string_strategy()) {
        let out = sanitize_string(&input);
        prop_assert!(!out.contains(DENYLIST));
        prop_assert!(out.chars().count() <= 1000);
        prop_assert_eq!(out.trim(), out.as_str());
    }

    #[test]
    fn prop_sanitize_string_is_idempotent(input in hostile_string_strategy()) {
        let once = sanitize_string(&input);
        prop_assert_eq!(sanitize_string(&once), once);
    }

    #[test]
    fn prop_long_strings_are_capped(len in 1001usize..5000) {
        let out = sanitize_string(&"x".repeat(len));
        prop_assert_eq!(out.len(), 1000);
    }

    #[test]
    fn prop_sanitized_array_is_bounded(items in prop::collection::vec(hostile_string_strategy(), 0..60)) {
        let input = Value::Array(items.into_iter().map(Value::String).collect());
        let out = sanitize_array(&input);
        prop_assert!(out.len() <= 20);
        for item in &out {
            let s = item.as_str().unwrap();
            prop_assert!(!s.is_empty());
            prop_assert!(!s.contains(DENYLIST));
        }
    }

    #[test]
    fn prop_non_array_sanitizes_to_empty(input in any::<String>()) {
        prop_assert!(sanitize_array(&Value::String(input)).is_empty());
    }

    #[test]
    fn prop_sanitized_object_is_clean_and_shallow(value in json_strategy()) {
        let out = sanitize_object(&value);

        let mut texts = Vec::new();
        strings_and_keys(&out, &mut texts);
        for text in texts {
            prop_assert!(!text.contains(DENYLIST));
        }
        prop_assert!(depth(&out) <= depth(&value));
        prop_assert!(depth(&out) <= 6);
    }

    #[test]
    fn prop_scalars_survive_object_sanitization(n in any::<i64>(), flag in any::<bool>()) {
        let out = sanitize_object(&json!({"count": n, "on": flag, "none": null}));
        prop_assert_eq!(out, json!({"count": n, "on": flag, "none": null}));
    }

    #[test]
    fn prop_public_https_urls_are_safe(host in "[a-z][a-z0-9]{0,20}", path in "[a-z0-9/]{0,30}") {
        let url = format!("https://{}.example.com/{}", host, path);
        prop_assert!(is_safe_url(&url, false));
        prop_assert!(is_safe_url(&url, true));
    }

    #[test]
    fn prop_other_schemes_are_rejected(
        scheme in prop_oneof![Just("ftp"), Just("javascript"), Just("file"), Just("data")],
        host in "[a-z]{1,10}",
    ) {
        let url = format!("{}://{}.example.com/x", scheme, host);
        prop_assert!(!is_safe_url(&url, false));
    }

    #[test]
    fn prop_private_ranges_rejected_in_production(b in 0u8..=255, c in 0u8..=255, d in 1u8..=254) {
        let url = format!("http://10.{}.{}.{}/admin", b, c, d);
        prop_assert!(!is_safe_url(&url, true));
        prop_assert!(is_safe_url(&url, false));
    }
}
