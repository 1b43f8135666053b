//! Plain text and Markdown decoding.
//!
//! Bytes are read as UTF-8 verbatim. Invalid sequences are replaced with
//! U+FFFD rather than rejected, and a leading byte-order mark is dropped.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
