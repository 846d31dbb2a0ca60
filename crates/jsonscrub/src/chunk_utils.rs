//! Chunking helpers for tests and benchmarks.

/// Split `payload` into approximately equal-sized chunks without
/// breaking UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Split `payload` into approximately equal-sized byte chunks. Unlike
/// [`produce_chunks`], boundaries may fall inside a UTF-8 sequence.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_byte_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at byte offsets derived from arbitrary `splits`, as
/// generated by property tests. Every chunk is non-empty and the chunks
/// concatenate back to `payload`.
#[must_use]
pub fn produce_split_chunks<'a>(payload: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(splits.len() + 1);
    let mut rest = payload;
    for &s in splits {
        if rest.is_empty() {
            break;
        }
        let size = 1 + (s % rest.len());
        let (chunk, tail) = rest.split_at(size);
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produce_chunks_example() {
        let payload = "[\"foo\",\"bar\"]";
        let chunks = produce_chunks(payload, 5);
        assert_eq!(chunks, vec!["[\"f", "oo\"", ",\"b", "ar\"", "]"]);
    }

    #[test]
    fn produce_chunks_respects_char_boundaries() {
        let payload = "[\"f\u{1F60A}o\",\"b\u{1F680}r\"]";
        let chunks = produce_chunks(payload, 5);
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn byte_chunks_may_split_sequences() {
        let payload = "\u{2603}\u{2603}".as_bytes();
        let chunks = produce_byte_chunks(payload, 3);
        assert_eq!(chunks, vec![&payload[..2], &payload[2..4], &payload[4..]]);
    }

    #[test]
    fn split_chunks_cover_payload() {
        let payload = b"abcdefgh";
        let chunks = produce_split_chunks(payload, &[0, 9, 2, 100]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.concat(), payload);
        assert_eq!(chunks[0], b"a");
        assert_eq!(chunks[1], b"bcd");
    }
}
