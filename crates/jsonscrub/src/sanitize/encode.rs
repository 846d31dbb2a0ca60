//! Output encoders used after cleaning.
use core::fmt::Write;

/// Escapes a string so it can be embedded between quotes in a JSON document.
///
/// `\`, `"` and control characters are escaped; everything else, including
/// non-ASCII text, is kept as is.
#[must_use]
pub fn escape_json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

/// Escapes a string for use inside a JavaScript string literal.
///
/// Quotes, `\` and `/` are backslash-escaped; control characters and all
/// non-ASCII characters become `\uXXXX` escapes (surrogate pairs above the
/// BMP).
#[must_use]
pub fn escape_javascript(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_ascii() && c >= '\u{20}' && c != '\u{7F}' => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
    out
}

/// Escapes the five XML special characters; non-ASCII characters become
/// decimal character references.
#[must_use]
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_ascii() => out.push(c),
            c => {
                let _ = write!(out, "&#{};", u32::from(c));
            }
        }
    }
    out
}

/// Escapes `&`, `<`, `>` and `"` as HTML entities.
#[must_use]
pub fn escape_html(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_escape_covers_structural_characters() {
        assert_eq!(
            escape_json_string("a\\b\"c\nd\te\rf"),
            r#"a\\b\"c\nd\te\rf"#
        );
        assert_eq!(escape_json_string("\u{1}"), r"\u0001");
        assert_eq!(escape_json_string("caf\u{e9}"), "caf\u{e9}");
    }

    #[test]
    fn javascript_escape_encodes_non_ascii() {
        assert_eq!(escape_javascript("it's </b>"), r"it\'s <\/b>");
        assert_eq!(escape_javascript("\u{e9}"), r"\u00E9");
        assert_eq!(escape_javascript("\u{1F600}"), r"\uD83D\uDE00");
    }

    #[test]
    fn xml_escape_uses_entities() {
        assert_eq!(
            escape_xml("<a href='x'>&</a>"),
            "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape_xml("\u{e9}"), "&#233;");
    }

    #[test]
    fn html_escape_handles_quotes() {
        assert_eq!(escape_html(r#"<"&">"#), "&lt;&quot;&amp;&quot;&gt;");
    }
}
