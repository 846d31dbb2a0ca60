//! Byte-to-char decoding for byte sources.
//!
//! Reads arrive in arbitrary chunks, so a UTF-8 sequence may be split between
//! two of them. [`Decoder`] keeps the unfinished prefix (at most three bytes)
//! and completes it with the next chunk instead of replacing it. Invalid
//! sequences decode to U+FFFD, one replacement per maximal invalid subpart, the
//! same policy `bstr::decode_utf8` applies.
//!
//! Invariants
//! - `carry` is empty or holds a strict prefix of a UTF-8 sequence whose
//!   completion is still possible (length 1..=3).
//! - Every input byte contributes to exactly one emitted char.
use crate::options::SourceEncoding;

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone)]
pub(crate) struct Decoder {
    encoding: SourceEncoding,
    carry: Vec<u8>,
}

impl Decoder {
    pub(crate) fn new(encoding: SourceEncoding) -> Self {
        Self {
            encoding,
            carry: Vec::with_capacity(4),
        }
    }

    /// Decodes `bytes`, calling `emit` for every complete char. An incomplete
    /// trailing sequence is kept for the next call.
    pub(crate) fn decode<E>(
        &mut self,
        bytes: &[u8],
        emit: &mut impl FnMut(char) -> Result<(), E>,
    ) -> Result<(), E> {
        match self.encoding {
            SourceEncoding::Latin1 => bytes.iter().try_for_each(|&b| emit(char::from(b))),
            SourceEncoding::Utf8 => self.decode_utf8(bytes, false, emit),
        }
    }

    /// Flushes any carried bytes at end of input. A dangling partial sequence
    /// becomes U+FFFD.
    pub(crate) fn finish<E>(&mut self, emit: &mut impl FnMut(char) -> Result<(), E>) -> Result<(), E> {
        match self.encoding {
            SourceEncoding::Latin1 => Ok(()),
            SourceEncoding::Utf8 => self.decode_utf8(&[], true, emit),
        }
    }

    fn decode_utf8<E>(
        &mut self,
        mut bytes: &[u8],
        eof: bool,
        emit: &mut impl FnMut(char) -> Result<(), E>,
    ) -> Result<(), E> {
        // Resolve the carried prefix one byte at a time so that no more than a
        // single sequence is ever copied.
        while !self.carry.is_empty() {
            let (ch, len) = bstr::decode_utf8(&self.carry);
            if ch.is_none() && len == self.carry.len() && len < 4 {
                if let Some((&b, rest)) = bytes.split_first() {
                    self.carry.push(b);
                    bytes = rest;
                    continue;
                }
                if !eof {
                    return Ok(());
                }
            }
            emit(ch.unwrap_or(REPLACEMENT))?;
            self.carry.drain(..len);
        }

        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b.is_ascii() {
                emit(char::from(b))?;
                i += 1;
                continue;
            }
            let rest = &bytes[i..];
            let (ch, len) = bstr::decode_utf8(rest);
            if ch.is_none() && len == rest.len() && len < 4 && !eof {
                self.carry.extend_from_slice(rest);
                return Ok(());
            }
            emit(ch.unwrap_or(REPLACEMENT))?;
            i += len;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn carried(&self) -> &[u8] {
        &self.carry
    }
}
