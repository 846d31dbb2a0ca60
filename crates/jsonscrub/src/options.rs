use serde::{Deserialize, Serialize};

/// How the scanner decides whether a `"` inside a string literal is escaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeMode {
    /// A quote is escaped iff it follows an odd run of backslashes.
    ///
    /// `"a\\"` closes at the final quote, because the two backslashes form an
    /// escaped backslash.
    #[default]
    Counted,
    /// A quote is escaped iff the immediately preceding character is a
    /// backslash.
    ///
    /// This is the single-character lookback rule of older request filters.
    /// It misreads `"a\\"`: the closing quote is taken as escaped and the
    /// literal runs on into whatever follows. Choose it only when output must
    /// stay byte-compatible with such filters.
    Lookback,
}

/// How raw source bytes are turned into characters before scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEncoding {
    /// Decode UTF-8. Invalid sequences become U+FFFD; sequences split across
    /// reads are reassembled.
    #[default]
    Utf8,
    /// Treat every byte as one character (U+0000..=U+00FF).
    ///
    /// Multi-byte text does not survive this: `é` (two bytes) comes out as
    /// `Ã©`. Provided for compatibility with byte-at-a-time filters.
    Latin1,
}

/// Configuration options for the string-literal scanner.
///
/// # Examples
///
/// ```rust
/// use jsonscrub::{EscapeMode, ScanOptions, SourceEncoding};
///
/// let options = ScanOptions {
///     escape_mode: EscapeMode::Lookback,
///     encoding: SourceEncoding::Latin1,
///     ..Default::default()
/// };
/// assert_eq!(options.initial_capacity, 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Escape detection rule for quotes inside string literals.
    ///
    /// # Default
    ///
    /// [`EscapeMode::Counted`]
    pub escape_mode: EscapeMode,

    /// Encoding used to decode byte sources. Ignored when the scanner is fed
    /// `&str` chunks, which are already text.
    ///
    /// # Default
    ///
    /// [`SourceEncoding::Utf8`]
    pub encoding: SourceEncoding,

    /// Capacity, in bytes, reserved up front for the output buffer.
    ///
    /// Request bodies are usually between 512 bytes and 2 KiB; nothing breaks
    /// when a document is larger.
    ///
    /// # Default
    ///
    /// `512`
    pub initial_capacity: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            escape_mode: EscapeMode::default(),
            encoding: SourceEncoding::default(),
            initial_capacity: 512,
        }
    }
}
