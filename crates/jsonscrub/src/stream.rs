//! Stream adapters around [`StringLiteralScanner`].
//!
//! - [`Scrubber`]: push-style. Feed text or byte chunks, get back whatever
//!   output they completed.
//! - [`ScrubReader`]: pull-style. Wraps any [`Read`] source and is itself a
//!   [`Read`].
//! - [`scrub_str`], [`scrub_bytes`], [`scrub_reader`]: materialize the whole
//!   result.
//!
//! Output is produced only up to the last closed literal: text inside an open
//! literal is held back until its closing quote arrives.
use std::io::{self, Read};

use tracing::warn;

use crate::{
    ScrubError, SanitizeError,
    decode::Decoder,
    options::ScanOptions,
    sanitize::Sanitize,
    scanner::{ScanSummary, StringLiteralScanner},
};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Push-style scrubber: feed chunks, collect output incrementally.
///
/// ```rust
/// use jsonscrub::{ScanOptions, Scrubber, XssSanitizer};
///
/// let sanitizer = XssSanitizer::json_body();
/// let mut scrubber = Scrubber::new(&sanitizer, ScanOptions::default());
/// let mut out = scrubber.feed(r#"{"msg":"<scr"#).unwrap();
/// assert_eq!(out, r#"{"msg":"#);
/// out += &scrubber.feed(r#"ipt>x</script>hi"}"#).unwrap();
/// let (rest, summary) = scrubber.finish().unwrap();
/// out += &rest;
/// assert_eq!(out, r#"{"msg":"hi"}"#);
/// assert_eq!(summary.literals_sanitized, 2);
/// ```
pub struct Scrubber<'s, S: Sanitize + ?Sized> {
    scanner: StringLiteralScanner<'s, S>,
    decoder: Decoder,
}

impl<'s, S: Sanitize + ?Sized> Scrubber<'s, S> {
    /// Creates a scrubber. Byte chunks are decoded per
    /// [`ScanOptions::encoding`].
    pub fn new(sanitize: &'s S, options: ScanOptions) -> Self {
        Self {
            scanner: StringLiteralScanner::new(sanitize, options),
            decoder: Decoder::new(options.encoding),
        }
    }

    /// Feeds already-decoded text and returns the output it completed.
    ///
    /// # Errors
    ///
    /// Returns the sanitizer's error. The scrubber must not be used afterwards.
    pub fn feed(&mut self, chunk: &str) -> Result<String, SanitizeError> {
        let mut out = String::with_capacity(chunk.len());
        self.feed_into(chunk, &mut out)?;
        Ok(out)
    }

    /// Like [`feed`](Self::feed), appending to `out`.
    ///
    /// A UTF-8 sequence left incomplete by [`feed_bytes`](Self::feed_bytes)
    /// is flushed as U+FFFD first, so text never overtakes earlier bytes.
    ///
    /// # Errors
    ///
    /// See [`feed`](Self::feed).
    pub fn feed_into(&mut self, chunk: &str, out: &mut String) -> Result<(), SanitizeError> {
        let scanner = &mut self.scanner;
        self.decoder.finish(&mut |c| scanner.push(c, out))?;
        self.scanner.push_str(chunk, out)
    }

    /// Decodes and feeds a byte chunk, returning the output it completed.
    ///
    /// # Errors
    ///
    /// See [`feed`](Self::feed).
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<String, SanitizeError> {
        let mut out = String::with_capacity(bytes.len());
        self.feed_bytes_into(bytes, &mut out)?;
        Ok(out)
    }

    /// Like [`feed_bytes`](Self::feed_bytes), appending to `out`.
    ///
    /// # Errors
    ///
    /// See [`feed`](Self::feed).
    pub fn feed_bytes_into(&mut self, bytes: &[u8], out: &mut String) -> Result<(), SanitizeError> {
        let scanner = &mut self.scanner;
        self.decoder.decode(bytes, &mut |c| scanner.push(c, out))
    }

    /// Ends the document, returning the remaining output and the summary.
    ///
    /// # Errors
    ///
    /// Returns the sanitizer's error if flushing a pending byte sequence
    /// closes a literal that fails to sanitize.
    pub fn finish(self) -> Result<(String, ScanSummary), SanitizeError> {
        let mut out = String::new();
        let summary = self.finish_into(&mut out)?;
        Ok((out, summary))
    }

    /// Like [`finish`](Self::finish), appending to `out`.
    ///
    /// # Errors
    ///
    /// See [`finish`](Self::finish).
    pub fn finish_into(mut self, out: &mut String) -> Result<ScanSummary, SanitizeError> {
        let scanner = &mut self.scanner;
        self.decoder.finish(&mut |c| scanner.push(c, out))?;
        Ok(self.scanner.finish())
    }
}

impl<S: Sanitize + ?Sized> core::fmt::Debug for Scrubber<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scrubber")
            .field("scanner", &self.scanner)
            .field("decoder", &self.decoder)
            .finish()
    }
}

/// Pull-style scrubber over a byte source.
///
/// Reads from the source in fixed-size blocks and yields scrubbed UTF-8.
/// Sanitizer failures surface as [`io::Error`]s of kind
/// [`Other`](io::ErrorKind::Other) wrapping a [`ScrubError`].
///
/// Any error ends the scan: output not yet read is discarded, and every later
/// `read` fails with the same kind and message.
///
/// ```rust
/// use std::io::Read;
///
/// use jsonscrub::{ScanOptions, ScrubReader};
///
/// let upper = |s: &str| s.to_uppercase();
/// let mut reader = ScrubReader::new(&br#"["a","b"]"#[..], &upper, ScanOptions::default());
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, r#"["A","B"]"#);
/// assert_eq!(reader.summary().unwrap().literals_sanitized, 2);
/// ```
pub struct ScrubReader<'s, R, S: Sanitize + ?Sized> {
    source: R,
    scrubber: Option<Scrubber<'s, S>>,
    input: Box<[u8]>,
    pending: String,
    pos: usize,
    summary: Option<ScanSummary>,
    failed: Option<(io::ErrorKind, String)>,
}

impl<'s, R: Read, S: Sanitize + ?Sized> ScrubReader<'s, R, S> {
    /// Wraps `source`.
    pub fn new(source: R, sanitize: &'s S, options: ScanOptions) -> Self {
        Self {
            source,
            scrubber: Some(Scrubber::new(sanitize, options)),
            input: vec![0; READ_BUFFER_SIZE].into_boxed_slice(),
            pending: String::with_capacity(options.initial_capacity),
            pos: 0,
            summary: None,
            failed: None,
        }
    }

    /// The scan summary, available once the source is exhausted. A failed
    /// scan has none.
    #[must_use]
    pub fn summary(&self) -> Option<ScanSummary> {
        self.summary
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn refill(&mut self) -> Result<(), ScrubError> {
        self.pending.clear();
        self.pos = 0;
        let Some(scrubber) = self.scrubber.as_mut() else {
            return Ok(());
        };
        let n = loop {
            match self.source.read(&mut self.input) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            if let Some(scrubber) = self.scrubber.take() {
                let summary = scrubber.finish_into(&mut self.pending)?;
                self.summary = Some(summary);
            }
            return Ok(());
        }
        scrubber.feed_bytes_into(&self.input[..n], &mut self.pending)?;
        Ok(())
    }

    fn fail(&mut self, err: &io::Error) {
        self.pending.clear();
        self.pos = 0;
        self.scrubber = None;
        self.summary = None;
        self.failed = Some((err.kind(), err.to_string()));
    }
}

impl<R: Read, S: Sanitize + ?Sized> Read for ScrubReader<'_, R, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some((kind, message)) = &self.failed {
            return Err(io::Error::new(*kind, message.clone()));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.pending.len() {
            if self.scrubber.is_none() {
                return Ok(0);
            }
            if let Err(err) = self.refill() {
                let err = io::Error::from(err);
                warn!(error = %err, "scrub aborted");
                self.fail(&err);
                return Err(err);
            }
        }
        let available = &self.pending.as_bytes()[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl<R, S: Sanitize + ?Sized> core::fmt::Debug for ScrubReader<'_, R, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrubReader")
            .field("scrubber", &self.scrubber)
            .field("pending", &(self.pending.len() - self.pos))
            .field("summary", &self.summary)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

/// Scrubs a complete document held in memory.
///
/// # Errors
///
/// Returns the sanitizer's error.
pub fn scrub_str<S: Sanitize + ?Sized>(
    input: &str,
    sanitize: &S,
    options: ScanOptions,
) -> Result<String, SanitizeError> {
    let mut out = String::with_capacity(options.initial_capacity.max(input.len()));
    let mut scrubber = Scrubber::new(sanitize, options);
    scrubber.feed_into(input, &mut out)?;
    scrubber.finish_into(&mut out)?;
    Ok(out)
}

/// Decodes and scrubs a complete byte document.
///
/// # Errors
///
/// Returns the sanitizer's error.
pub fn scrub_bytes<S: Sanitize + ?Sized>(
    input: &[u8],
    sanitize: &S,
    options: ScanOptions,
) -> Result<String, SanitizeError> {
    let mut out = String::with_capacity(options.initial_capacity.max(input.len()));
    let mut scrubber = Scrubber::new(sanitize, options);
    scrubber.feed_bytes_into(input, &mut out)?;
    scrubber.finish_into(&mut out)?;
    Ok(out)
}

/// Reads `source` to the end and returns the scrubbed document.
///
/// # Errors
///
/// Returns [`ScrubError::Io`] if reading fails and [`ScrubError::Sanitize`] if
/// the sanitizer rejects a literal.
pub fn scrub_reader<R: Read, S: Sanitize + ?Sized>(
    mut source: R,
    sanitize: &S,
    options: ScanOptions,
) -> Result<String, ScrubError> {
    let mut out = String::with_capacity(options.initial_capacity);
    let mut scrubber = Scrubber::new(sanitize, options);
    let mut buf = vec![0; READ_BUFFER_SIZE];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        scrubber.feed_bytes_into(&buf[..n], &mut out)?;
    }
    scrubber.finish_into(&mut out)?;
    Ok(out)
}
