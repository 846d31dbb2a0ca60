//! Canonicalization: reduce a value to its simplest decoded form before the
//! markup cleaner looks at it.
//!
//! Attackers hide markup behind encodings (`%3Cscript%3E`, `&lt;script&gt;`,
//! `\u003Cscript\u003E`). A [`Canonicalizer`] runs each of its [`Codec`]s over
//! the value, round after round, until no codec changes it any more.
//!
//! In strict mode two situations are rejected instead of decoded:
//! - *multiple encoding*: more than one round changed the value
//!   (`%253C` is `%3C` after one round and `<` after two);
//! - *mixed encoding*: decoding switched between different codecs more than
//!   once.
//!
//! NUL characters are removed from the result.
use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::CanonicalizeError;

/// One decoding scheme understood by the [`Canonicalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    /// JSON string escapes: `\"`, `\\`, `\/`, `\b`, `\f`, `\n`, `\r`, `\t`
    /// and `\uXXXX` (including surrogate pairs).
    Json,
    /// Named and numeric HTML character references.
    HtmlEntity,
    /// `%XX` URL escapes. Decoded bytes that are not UTF-8 become U+FFFD.
    Percent,
}

impl Codec {
    /// Decodes one layer. Returns the input borrowed when there is nothing to
    /// decode.
    #[must_use]
    pub fn decode(self, input: &str) -> Cow<'_, str> {
        match self {
            Codec::Json => decode_json_escapes(input),
            Codec::HtmlEntity => html_escape::decode_html_entities(input),
            Codec::Percent => percent_decode_str(input).decode_utf8_lossy(),
        }
    }
}

/// Repeatedly decodes a value with a fixed list of codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalizer {
    codecs: Vec<Codec>,
    allow_multiple: bool,
    allow_mixed: bool,
}

impl Canonicalizer {
    /// Creates a strict canonicalizer over `codecs`, applied in order.
    #[must_use]
    pub fn new(codecs: impl Into<Vec<Codec>>) -> Self {
        Self {
            codecs: codecs.into(),
            allow_multiple: false,
            allow_mixed: false,
        }
    }

    /// Strict canonicalizer for string literals of JSON documents: JSON
    /// escapes, HTML entities, then percent escapes.
    #[must_use]
    pub fn json() -> Self {
        Self::new([Codec::Json, Codec::HtmlEntity, Codec::Percent])
    }

    /// Strict canonicalizer for header, path and query values: HTML entities,
    /// then percent escapes.
    #[must_use]
    pub fn text() -> Self {
        Self::new([Codec::HtmlEntity, Codec::Percent])
    }

    /// Accept values that needed more than one decoding round.
    #[must_use]
    pub fn allow_multiple(mut self, allow: bool) -> Self {
        self.allow_multiple = allow;
        self
    }

    /// Accept values that switched codecs more than once.
    #[must_use]
    pub fn allow_mixed(mut self, allow: bool) -> Self {
        self.allow_mixed = allow;
        self
    }

    /// The codecs applied each round, in order.
    #[must_use]
    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// Decodes `input` until it is stable.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`CanonicalizeError::MultipleEncoding`] or
    /// [`CanonicalizeError::MixedEncoding`] for values that were encoded more
    /// than once or with interleaved schemes.
    pub fn canonicalize(&self, input: &str) -> Result<String, CanonicalizeError> {
        let mut working = input.to_string();
        let mut rounds = 0usize;
        let mut switches = 0usize;
        let mut last_codec: Option<Codec> = None;

        loop {
            let mut changed_this_round = false;
            for &codec in &self.codecs {
                let decoded = match codec.decode(&working) {
                    Cow::Owned(decoded) if decoded != working => Some(decoded),
                    _ => None,
                };
                let Some(decoded) = decoded else { continue };
                working = decoded;

                if last_codec.is_some_and(|last| last != codec) {
                    switches += 1;
                }
                last_codec = Some(codec);
                if !changed_this_round {
                    rounds += 1;
                    changed_this_round = true;
                }
            }
            if !changed_this_round {
                break;
            }
        }

        if rounds >= 2 && !self.allow_multiple {
            return Err(CanonicalizeError::MultipleEncoding {
                input: input.to_string(),
            });
        }
        if switches > 1 && !self.allow_mixed {
            return Err(CanonicalizeError::MixedEncoding {
                input: input.to_string(),
            });
        }

        working.retain(|c| c != '\0');
        Ok(working)
    }
}

fn decode_json_escapes(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let decoded = match tail.as_bytes().first() {
            Some(b'"') => Some(('"', 1)),
            Some(b'\\') => Some(('\\', 1)),
            Some(b'/') => Some(('/', 1)),
            Some(b'b') => Some(('\u{08}', 1)),
            Some(b'f') => Some(('\u{0C}', 1)),
            Some(b'n') => Some(('\n', 1)),
            Some(b'r') => Some(('\r', 1)),
            Some(b't') => Some(('\t', 1)),
            Some(b'u') => unicode_escape(&tail[1..]).map(|(c, len)| (c, len + 1)),
            _ => None,
        };
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                // Not an escape we understand; keep the backslash literally.
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Parses the `XXXX` of a `\uXXXX` escape (and the low half of a surrogate
/// pair when needed). Returns the char and the number of bytes consumed.
fn unicode_escape(s: &str) -> Option<(char, usize)> {
    let high = hex4(s)?;
    if let Some(c) = char::from_u32(u32::from(high)) {
        return Some((c, 4));
    }
    if !(0xD800..0xDC00).contains(&high) {
        return None;
    }
    let low = s.get(4..)?.strip_prefix("\\u").and_then(hex4)?;
    let c = char::decode_utf16([high, low]).next()?.ok()?;
    Some((c, 10))
}

fn hex4(s: &str) -> Option<u16> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
