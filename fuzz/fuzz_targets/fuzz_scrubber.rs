#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use jsonscrub::{
    EscapeMode, Identity, ScanOptions, Scrubber, SourceEncoding, XssSanitizer, scrub_bytes,
    scrub_str,
};
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag + 4-byte seed

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(21)?;
        let value = match node_type {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => Value::from(u.arbitrary::<i64>()?),
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Split `data` into chunks of at least one byte whose sizes are derived from
/// `split_seed`. Splits may land inside UTF-8 sequences.
fn split_into_chunks(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut rest = data;
    let mut seed = split_seed;
    while !rest.is_empty() {
        let size = (seed as usize % rest.len()) + 1;
        let (chunk, tail) = rest.split_at(size);
        chunks.push(chunk);
        rest = tail;
        seed = seed.rotate_left(7) ^ 0x9E37_79B9_7F4A_7C15;
    }
    chunks
}

fn scrubber(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u64::from(u32::from_le_bytes(data[1..5].try_into().unwrap()));
    let data = &data[HEADER..];

    let options = ScanOptions {
        escape_mode: if flags & 1 != 0 {
            EscapeMode::Lookback
        } else {
            EscapeMode::Counted
        },
        encoding: if flags & 2 != 0 {
            SourceEncoding::Latin1
        } else {
            SourceEncoding::Utf8
        },
        ..Default::default()
    };

    // Chunking must never change the output, whatever the sanitizer does.
    let shout = |s: &str| s.to_uppercase();
    let whole = scrub_bytes(data, &shout, options).unwrap();
    let mut scrubber = Scrubber::new(&shout, options);
    let mut chunked = String::new();
    for chunk in split_into_chunks(data, split_seed) {
        scrubber.feed_bytes_into(chunk, &mut chunked).unwrap();
    }
    let summary = scrubber.finish_into(&mut chunked).unwrap();
    assert_eq!(whole, chunked);
    assert!(summary.literals_sanitized <= summary.chars_consumed);

    // The default pipeline may reject input but must not panic.
    let _ = scrub_bytes(data, &XssSanitizer::json_body(), options);

    // Serialized JSON survives an identity scan in counted mode.
    if flags & 4 != 0 {
        if let Ok(value) = ArbitraryValue::arbitrary(&mut Unstructured::new(data)) {
            let text = serde_json::to_string(&value.0).expect("serialize arbitrary value");
            let out = scrub_str(&text, &Identity, ScanOptions::default()).unwrap();
            assert_eq!(out, text);
        }
    }
}

fuzz_target!(|data: &[u8]| scrubber(data));
