use quickcheck::QuickCheck;
use serde_json::{Map, Value};

use crate::{FallibleFn, Identity, SanitizeError, ScanOptions, escape_json_string, scrub_str};

fn build_document(entries: &[(String, String)], numbers: &[i64], flag: bool) -> Value {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    map.insert("numbers".to_string(), Value::from(numbers.to_vec()));
    let strings: Vec<Value> = entries
        .iter()
        .map(|(_, v)| Value::String(v.clone()))
        .collect();
    Value::Array(vec![Value::Object(map), Value::Array(strings), Value::Bool(flag)])
}

fn render(value: &Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap()
    } else {
        serde_json::to_string(value).unwrap()
    }
}

/// Property: any document serialized by `serde_json` comes out of an identity
/// scan byte-for-byte unchanged.
#[test]
fn identity_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(entries: Vec<(String, String)>, numbers: Vec<i64>, pretty: bool) -> bool {
        let text = render(&build_document(&entries, &numbers, pretty), pretty);
        scrub_str(&text, &Identity, ScanOptions::default()).unwrap() == text
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<(String, String)>, Vec<i64>, bool) -> bool);
}

/// Property: every literal handed to the sanitizer is a complete JSON string
/// body. Decoding and re-encoding each one yields a document that parses to
/// the original value.
#[test]
fn literals_are_complete_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(entries: Vec<(String, String)>, numbers: Vec<i64>) -> bool {
        let value = build_document(&entries, &numbers, false);
        let text = render(&value, false);
        let reencode = FallibleFn(|literal: &str| -> Result<String, SanitizeError> {
            let decoded: String = serde_json::from_str(&format!("\"{literal}\""))
                .map_err(|e| SanitizeError::with_source("literal is not a JSON string", e))?;
            Ok(escape_json_string(&decoded))
        });
        let out = scrub_str(&text, &reencode, ScanOptions::default()).unwrap();
        serde_json::from_str::<Value>(&out).unwrap() == value
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<(String, String)>, Vec<i64>) -> bool);
}
