//! Escape tracking for the string-literal scanner.
//!
//! The scanner only needs one answer from this module: *is the quote I am
//! looking at escaped?* [`EscapeTracker`] answers that question under either
//! [`EscapeMode`], observing every raw character of the source (delimiters
//! included) exactly once.
//!
//! - [`EscapeMode::Lookback`] compares against the single previous character.
//! - [`EscapeMode::Counted`] keeps the parity of the current backslash run, so
//!   `\\"` (escaped backslash, then quote) is recognized as a closing quote.
use crate::options::EscapeMode;

const ESCAPE: char = '\\';

#[derive(Debug, Clone)]
pub(crate) struct EscapeTracker {
    mode: EscapeMode,
    prev: char,
    odd_backslashes: bool,
}

impl EscapeTracker {
    pub(crate) fn new(mode: EscapeMode) -> Self {
        Self {
            mode,
            prev: '\0',
            odd_backslashes: false,
        }
    }

    /// Whether a quote arriving now would be escaped.
    pub(crate) fn quote_is_escaped(&self) -> bool {
        match self.mode {
            EscapeMode::Lookback => self.prev == ESCAPE,
            EscapeMode::Counted => self.odd_backslashes,
        }
    }

    /// Records a consumed character. Must be called for every character,
    /// after the scanner has acted on it.
    pub(crate) fn observe(&mut self, c: char) {
        self.prev = c;
        if c == ESCAPE {
            self.odd_backslashes = !self.odd_backslashes;
        } else {
            self.odd_backslashes = false;
        }
    }

    #[cfg(test)]
    pub(crate) fn prev(&self) -> char {
        self.prev
    }
}
