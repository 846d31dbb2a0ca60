#![allow(missing_docs)]
#![allow(dead_code)]

/// A request body as a single-page app would send it: nested objects,
/// arrays, numbers and a few hostile strings.
pub const PROFILE_UPDATE: &str = r#"{"user":{"name":"Ada <script>steal()</script>Lovelace","bio":"I like <b>engines</b> &amp; <i>maths</i>","site":"<a href=\"javascript:alert(1)\">me</a>"},"tags":["math","<img src=x onerror=alert(1)>"],"age":36,"active":true}"#;

/// Split `payload` into byte chunks of `size`, ignoring UTF-8 boundaries.
pub fn byte_chunks(payload: &[u8], size: usize) -> Vec<&[u8]> {
    payload.chunks(size.max(1)).collect()
}
