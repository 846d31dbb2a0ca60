use std::error::Error as _;

use rstest::rstest;

use super::*;
use crate::CanonicalizeError;

#[rstest]
#[case::script("<script>alert(1)</script>hello", "hello")]
#[case::json_escaped_script(r"\u003Cscript\u003Ealert(1)\u003C/script\u003E", "")]
#[case::percent_encoded_img("%3Cimg src=x onerror=alert(1)%3E", "<img>")]
#[case::entity_encoded_link(
    "&lt;a href=&quot;javascript:alert(1)&quot;&gt;x&lt;/a&gt;",
    "<a>x</a>"
)]
#[case::quotes_survive(r#"say \"hi\""#, r#"say \"hi\""#)]
#[case::backslash_survives(r"x\\y", r"x\\y")]
#[case::ampersand_escaped("Tom &amp; Jerry", "Tom &amp; Jerry")]
#[case::plain("hello world", "hello world")]
fn json_body_pipeline(#[case] literal: &str, #[case] expected: &str) {
    assert_eq!(XssSanitizer::json_body().sanitize(literal).unwrap(), expected);
}

#[test]
fn allowed_markup_keeps_json_valid() {
    let out = XssSanitizer::json_body()
        .sanitize(r#"<a href=\"https://x.io\" onclick=\"e()\">x</a>"#)
        .unwrap();
    assert_eq!(out, r#"<a href=\"https://x.io\">x</a>"#);
}

#[test]
fn double_encoding_is_rejected_by_default() {
    let err = XssSanitizer::json_body().sanitize("%253Cb%253E").unwrap_err();
    assert_eq!(err.to_string(), "canonicalization rejected input");
    let source = err
        .source()
        .and_then(|e| e.downcast_ref::<CanonicalizeError>())
        .unwrap();
    assert!(matches!(source, CanonicalizeError::MultipleEncoding { .. }));
}

#[test]
fn config_can_relax_canonicalization_and_escaping() {
    let config = SanitizeConfig {
        safelist: SafelistPreset::SimpleText,
        json_escape: false,
        allow_multiple_encoding: true,
        allow_mixed_encoding: true,
    };
    let sanitizer = XssSanitizer::from_config(&config);
    assert_eq!(sanitizer.sanitize("%253Cb%253Ex").unwrap(), "<b>x</b>");
    assert_eq!(sanitizer.sanitize(r"a\nb").unwrap(), "a\nb");
}

#[test]
fn empty_literal_short_circuits() {
    assert_eq!(XssSanitizer::json_body().sanitize("").unwrap(), "");
}

#[test]
fn identity_and_closures_are_sanitizers() {
    assert_eq!(Identity.sanitize(r"a\n").unwrap(), r"a\n");
    let upper = |s: &str| s.to_uppercase();
    assert_eq!(upper.sanitize("ab").unwrap(), "AB");
}

#[rstest]
#[case::clean_keeps_simple_tags(TextPolicy::Clean, "<b>bold</b><script>x</script>", "<b>bold</b>")]
#[case::clean_plain_path(TextPolicy::Clean, "/users/42", "/users/42")]
#[case::clean_and_escape(TextPolicy::CleanAndEscape, "<b>x</b><i", "&lt;b&gt;x&lt;/b&gt;")]
#[case::escape(
    TextPolicy::Escape,
    "<a href='x'>",
    r"&amp;lt;a href=\&amp;apos;x\&amp;apos;&amp;gt;"
)]
#[case::escape_empty(TextPolicy::Escape, "", "")]
fn text_policies(#[case] policy: TextPolicy, #[case] value: &str, #[case] expected: &str) {
    let sanitizer = TextSanitizer::new(policy);
    assert_eq!(sanitizer.sanitize(value).unwrap(), expected);
    assert_eq!(
        TextSanitizer::default().sanitize_with(policy, value).unwrap(),
        expected
    );
}

#[test]
fn text_clean_rejects_double_encoding() {
    assert!(
        TextSanitizer::new(TextPolicy::Clean)
            .sanitize("%253Cscript%253E")
            .is_err()
    );
}

#[test]
fn sanitize_config_defaults() {
    let config = SanitizeConfig::default();
    assert_eq!(config.safelist, SafelistPreset::Relaxed);
    assert!(config.json_escape);
    assert!(!config.allow_multiple_encoding);
    assert!(!config.allow_mixed_encoding);
}
