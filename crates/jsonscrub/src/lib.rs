//! Streaming, JSON-aware XSS scrubbing.
//!
//! `jsonscrub` rewrites a JSON document in a single forward pass, replacing
//! the content of every string literal with the output of a [`Sanitize`]
//! implementation while copying everything else verbatim. It does not parse
//! JSON: the only syntax it knows is the `"` delimiter and the `\` escape, so
//! malformed or truncated input is handled the same way as valid input.
//!
//! ```rust
//! use jsonscrub::{ScanOptions, XssSanitizer, scrub_str};
//!
//! let sanitizer = XssSanitizer::json_body();
//! let out = scrub_str(
//!     r#"{"comment":"<script>alert(1)</script>nice <b>post</b>","votes":3}"#,
//!     &sanitizer,
//!     ScanOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(out, r#"{"comment":"nice <b>post</b>","votes":3}"#);
//! ```
//!
//! The crate also ships the pieces around the scanner: byte decoding with
//! UTF-8 carry-over ([`Scrubber`], [`ScrubReader`]), the default
//! canonicalize-clean-escape pipeline ([`XssSanitizer`]), a request filter
//! stage over [`http::Request`] ([`XssFilter`]) and TOML configuration
//! ([`ScrubConfig`]).

mod config;
mod decode;
mod error;
mod escape;
mod filter;
mod options;
mod sanitize;
mod scanner;
mod stream;

#[doc(hidden)]
pub mod chunk_utils;

#[cfg(test)]
mod tests;

pub use config::ScrubConfig;
pub use error::{CanonicalizeError, ConfigError, FilterError, SanitizeError, ScrubError};
pub use filter::{FilterConfig, XssFilter};
pub use options::{EscapeMode, ScanOptions, SourceEncoding};
pub use sanitize::{
    FallibleFn, Identity, Sanitize, SanitizeConfig, TextPolicy, TextSanitizer, XssSanitizer,
    canonicalize::{Canonicalizer, Codec},
    encode::{escape_html, escape_javascript, escape_json_string, escape_xml},
    safelist::{Safelist, SafelistPreset},
};
pub use scanner::{ScanSummary, StringLiteralScanner};
pub use stream::{ScrubReader, Scrubber, scrub_bytes, scrub_reader, scrub_str};
