//! Scanner: the single-pass string-literal state machine.
//!
//! What it does
//! - Consumes characters one at a time (or in `&str` runs) and partitions them
//!   into *structural* content, which is written straight to the output, and
//!   *string-literal* content, which is accumulated until the literal closes.
//! - On every unescaped closing quote, writes `"` + `sanitize(literal)` + `"`.
//!
//! Scope
//! - No tokenizer and no grammar. Braces, colons, numbers and garbage are all
//!   the same to the scanner; only `"` and the escape rule matter.
//! - The scanner never fails on its own. Errors come only from the injected
//!   [`Sanitize`] implementation and are returned unchanged.
//!
//! Invariants
//! - `inside_string` is true iff an odd number of unescaped delimiters has
//!   been consumed.
//! - While `inside_string`, the accumulator holds exactly the characters seen
//!   since the opening delimiter. It is cleared (never emitted) on open.
//! - Every consumed character goes to exactly one of {accumulator, output},
//!   except delimiters, which are re-synthesized around the sanitized content.
//! - The opening delimiter is withheld until the matching close. A literal
//!   that is still open at [`finish`](StringLiteralScanner::finish) is dropped
//!   together with its opening quote.
//!
//! Example
//! ```rust
//! use jsonscrub::{ScanOptions, StringLiteralScanner};
//!
//! let upper = |s: &str| s.to_uppercase();
//! let mut scanner = StringLiteralScanner::new(&upper, ScanOptions::default());
//! let mut out = String::new();
//! scanner.push_str(r#"{"k":"v"}"#, &mut out).unwrap();
//! let summary = scanner.finish();
//! assert_eq!(out, r#"{"K":"V"}"#);
//! assert_eq!(summary.literals_sanitized, 2);
//! ```
use tracing::{debug, trace};

use crate::{
    SanitizeError,
    escape::EscapeTracker,
    options::ScanOptions,
    sanitize::Sanitize,
};

const DELIMITER: char = '"';

/// Mutable state of one scan pass.
#[derive(Debug, Clone)]
struct ScanState {
    inside_string: bool,
    accumulator: String,
    escape: EscapeTracker,
}

/// Counters reported when a scan pass ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of closed literals passed through the sanitize function.
    pub literals_sanitized: usize,
    /// Number of source characters consumed, delimiters included.
    pub chars_consumed: usize,
    /// Length in chars of the unterminated literal discarded at end of input,
    /// if any.
    pub dropped_literal_chars: Option<usize>,
}

/// Single-pass scanner that routes JSON string literals through a sanitizer.
///
/// The scanner borrows its sanitizer; one sanitizer (with its compiled
/// policies) can serve any number of scans. Each scanner instance handles one
/// document and is consumed by [`finish`](Self::finish).
pub struct StringLiteralScanner<'s, S: Sanitize + ?Sized> {
    state: ScanState,
    sanitize: &'s S,
    summary: ScanSummary,
}

impl<'s, S: Sanitize + ?Sized> StringLiteralScanner<'s, S> {
    /// Creates a scanner positioned before the first character.
    pub fn new(sanitize: &'s S, options: ScanOptions) -> Self {
        Self {
            state: ScanState {
                inside_string: false,
                accumulator: String::new(),
                escape: EscapeTracker::new(options.escape_mode),
            },
            sanitize,
            summary: ScanSummary::default(),
        }
    }

    /// Returns whether the scanner is currently inside a string literal.
    #[must_use]
    pub fn is_inside_string(&self) -> bool {
        self.state.inside_string
    }

    /// Consumes one character, appending any produced output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the sanitizer's error if `c` closes a literal and sanitizing it
    /// fails. The scan must not be continued after an error.
    pub fn push(&mut self, c: char, out: &mut String) -> Result<(), SanitizeError> {
        self.summary.chars_consumed += 1;
        let state = &mut self.state;

        if c == DELIMITER && !state.inside_string {
            state.inside_string = true;
            state.accumulator.clear();
        } else if c == DELIMITER && !state.escape.quote_is_escaped() {
            state.inside_string = false;
            let clean = self.sanitize.sanitize(&state.accumulator)?;
            trace!(
                raw_len = state.accumulator.len(),
                clean_len = clean.len(),
                "sanitized string literal"
            );
            out.reserve(clean.len() + 2);
            out.push(DELIMITER);
            out.push_str(&clean);
            out.push(DELIMITER);
            state.accumulator.clear();
            self.summary.literals_sanitized += 1;
        } else if state.inside_string {
            state.accumulator.push(c);
        } else {
            out.push(c);
        }

        state.escape.observe(c);
        Ok(())
    }

    /// Consumes a run of already-decoded text.
    ///
    /// Structural runs between literals are copied in bulk; characters inside
    /// literals go through [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_str(&mut self, mut chunk: &str, out: &mut String) -> Result<(), SanitizeError> {
        while !chunk.is_empty() {
            if !self.state.inside_string {
                let end = chunk.find(DELIMITER).unwrap_or(chunk.len());
                if end > 0 {
                    let structural = &chunk[..end];
                    out.push_str(structural);
                    self.summary.chars_consumed += structural.chars().count();
                    // Only the last character can influence escape detection
                    // once the next literal opens.
                    if let Some(last) = structural.chars().next_back() {
                        self.state.escape.observe(last);
                    }
                    chunk = &chunk[end..];
                    continue;
                }
            }
            let mut chars = chunk.chars();
            if let Some(c) = chars.next() {
                self.push(c, out)?;
            }
            chunk = chars.as_str();
        }
        Ok(())
    }

    /// Ends the pass. An unterminated literal is discarded without error.
    #[must_use]
    pub fn finish(self) -> ScanSummary {
        let mut summary = self.summary;
        if self.state.inside_string {
            let dropped = self.state.accumulator.chars().count();
            debug!(
                dropped_chars = dropped,
                "discarding unterminated string literal at end of input"
            );
            summary.dropped_literal_chars = Some(dropped);
        }
        summary
    }

    #[cfg(test)]
    fn accumulator(&self) -> &str {
        &self.state.accumulator
    }

    #[cfg(test)]
    fn prev_char(&self) -> char {
        self.state.escape.prev()
    }
}

impl<S: Sanitize + ?Sized> core::fmt::Debug for StringLiteralScanner<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StringLiteralScanner")
            .field("state", &self.state)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
