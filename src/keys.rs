//! Object key normalization for listings
//!
//! Every listed key is exposed three ways: the raw key exactly as the backend
//! reports it, a percent-encoded form safe to embed in one URL path segment,
//! and a best-effort human-readable display name.

use std::borrow::Cow;

/// Percent-encode a key for use as a single URL path segment.
///
/// Everything outside `A-Z a-z 0-9 - _ . ~` is escaped, including `/`, so a
/// key with separators still travels as one segment.
pub fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Reverse [`encode_key`]. Fails only if the decoded bytes are not UTF-8.
pub fn decode_key(encoded: &str) -> Result<Cow<'_, str>, std::string::FromUtf8Error> {
    urlencoding::decode(encoded)
}

/// Best-effort display name for a raw key.
///
/// Uploads coming from some multipart parsers store UTF-8 filenames whose bytes
/// were read as Latin-1, one character per byte. Taking each UTF-16 code unit
/// of the key as a single byte and reading the result as UTF-8 repairs those.
///
/// This is NOT a faithful transcoding: when the reinterpreted bytes are not
/// valid UTF-8 (a key that was already proper UTF-8, arbitrary binary keys)
/// the raw key is returned unchanged. No lossy decode happens, so a correct
/// UTF-8 key such as `café.txt` is never shown as `caf\u{FFFD}.txt`. Never use
/// it to address an object.
pub fn display_name(key: &str) -> String {
    if key.is_ascii() {
        return key.to_string();
    }
    let mut bytes = Vec::with_capacity(key.len());
    for unit in key.encode_utf16() {
        match u8::try_from(unit) {
            Ok(b) => bytes.push(b),
            Err(_) => return key.to_string(),
        }
    }
    String::from_utf8(bytes).unwrap_or_else(|_| key.to_string())
}
