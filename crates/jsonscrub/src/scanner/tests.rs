use std::cell::RefCell;

use rstest::rstest;

use super::*;
use crate::options::EscapeMode;

fn identity(s: &str) -> String {
    s.to_string()
}

/// Runs a scan with a recording sanitizer and returns (output, calls, summary).
fn scan_recording(input: &str, mode: EscapeMode) -> (String, Vec<String>, ScanSummary) {
    let calls = RefCell::new(Vec::new());
    let record = |s: &str| {
        calls.borrow_mut().push(s.to_string());
        s.to_string()
    };
    let mut scanner = StringLiteralScanner::new(
        &record,
        ScanOptions {
            escape_mode: mode,
            ..Default::default()
        },
    );
    let mut out = String::new();
    for c in input.chars() {
        scanner.push(c, &mut out).unwrap();
    }
    let summary = scanner.finish();
    (out, calls.into_inner(), summary)
}

#[test]
fn opening_quote_is_withheld_and_accumulator_cleared() {
    let mut scanner = StringLiteralScanner::new(&identity, ScanOptions::default());
    let mut out = String::new();
    scanner.push_str("{\"ab", &mut out).unwrap();
    assert_eq!(out, "{");
    assert!(scanner.is_inside_string());
    assert_eq!(scanner.accumulator(), "ab");
    assert_eq!(scanner.prev_char(), 'b');
}

#[test]
fn closing_quote_emits_sanitized_literal() {
    let shout = |s: &str| s.to_uppercase();
    let mut scanner = StringLiteralScanner::new(&shout, ScanOptions::default());
    let mut out = String::new();
    scanner.push_str("[\"ab\"", &mut out).unwrap();
    assert_eq!(out, "[\"AB\"");
    assert!(!scanner.is_inside_string());
    assert_eq!(scanner.accumulator(), "");
    assert_eq!(scanner.prev_char(), '"');
}

#[test]
fn sanitizer_may_change_length() {
    let expand = |s: &str| format!("<{s}>");
    let drop_all = |_: &str| String::new();
    let mut out = String::new();
    let mut scanner = StringLiteralScanner::new(&expand, ScanOptions::default());
    scanner.push_str(r#"{"a":"bc"}"#, &mut out).unwrap();
    assert_eq!(out, r#"{"<a>":"<bc>"}"#);

    let mut out = String::new();
    let mut scanner = StringLiteralScanner::new(&drop_all, ScanOptions::default());
    scanner.push_str(r#"{"a":"bc"}"#, &mut out).unwrap();
    assert_eq!(out, r#"{"":""}"#);
}

#[rstest]
#[case::counted(EscapeMode::Counted)]
#[case::lookback(EscapeMode::Lookback)]
fn escaped_quote_stays_inside_literal(#[case] mode: EscapeMode) {
    let (out, calls, _) = scan_recording(r#"{"k":"a\"b"}"#, mode);
    assert_eq!(out, r#"{"k":"a\"b"}"#);
    assert_eq!(calls, vec!["k".to_string(), r#"a\"b"#.to_string()]);
}

#[test]
fn escaped_backslash_before_quote_closes_when_counted() {
    let (out, calls, summary) = scan_recording(r#"{"k":"a\\","n":1}"#, EscapeMode::Counted);
    assert_eq!(out, r#"{"k":"a\\","n":1}"#);
    assert_eq!(calls, vec!["k", r"a\\", "n"]);
    assert_eq!(summary.dropped_literal_chars, None);
}

#[test]
fn escaped_backslash_before_quote_is_misread_by_lookback() {
    // The quote after `\\` is taken as escaped, so the literal swallows the
    // following structure and the next quote closes it instead.
    let (out, calls, summary) = scan_recording(r#"{"k":"a\\","n":1}"#, EscapeMode::Lookback);
    assert_eq!(calls, vec!["k", r#"a\\","#]);
    assert_eq!(out, r#"{"k":"a\\","n"#);
    assert_eq!(summary.literals_sanitized, 2);
    assert_eq!(summary.dropped_literal_chars, Some(3));
}

#[test]
fn empty_literal_is_sanitized_once() {
    let (out, calls, summary) = scan_recording(r#"["",""]"#, EscapeMode::Counted);
    assert_eq!(out, r#"["",""]"#);
    assert_eq!(calls, vec!["", ""]);
    assert_eq!(summary.literals_sanitized, 2);
}

#[test]
fn backslash_before_opening_quote_does_not_matter() {
    // Structural backslashes are garbage, but the delimiter itself updates the
    // previous character, so the empty literal closes normally.
    for mode in [EscapeMode::Counted, EscapeMode::Lookback] {
        let (out, calls, _) = scan_recording(r#"\"",1"#, mode);
        assert_eq!(out, r#"\"",1"#, "{mode:?}");
        assert_eq!(calls, vec![""]);
    }
}

#[test]
fn push_str_matches_push() {
    let input = "  {\"a\" : [1, 2.5e3, \"x\\\"y\", null, true],\n \"b\":\"\u{e9}\"}\t";
    let (expected, _, expected_summary) = scan_recording(input, EscapeMode::Counted);

    let mut scanner = StringLiteralScanner::new(&identity, ScanOptions::default());
    let mut out = String::new();
    scanner.push_str(input, &mut out).unwrap();
    let summary = scanner.finish();
    assert_eq!(out, expected);
    assert_eq!(summary, expected_summary);
    assert_eq!(summary.chars_consumed, input.chars().count());
}

#[test]
fn truncated_literal_is_dropped_with_its_quote() {
    let (out, calls, summary) = scan_recording(r#"{"k":"unterminated"#, EscapeMode::Counted);
    assert_eq!(out, r#"{"k":"#);
    assert_eq!(calls, vec!["k"]);
    assert_eq!(summary.dropped_literal_chars, Some("unterminated".len()));
}

#[test]
fn sanitize_error_is_returned_unchanged() {
    use crate::sanitize::FallibleFn;

    let reject = FallibleFn(|s: &str| {
        if s.contains('<') {
            Err(SanitizeError::msg("markup not allowed"))
        } else {
            Ok(s.to_string())
        }
    });
    let mut scanner = StringLiteralScanner::new(&reject, ScanOptions::default());
    let mut out = String::new();
    let err = scanner
        .push_str(r#"{"ok":"<b>"}"#, &mut out)
        .unwrap_err();
    assert_eq!(err.to_string(), "markup not allowed");
    // Output up to the failing literal was produced, nothing after it.
    assert_eq!(out, r#"{"ok":"#);
}
