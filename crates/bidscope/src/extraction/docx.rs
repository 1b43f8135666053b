//! DOCX (Microsoft Word) text extraction using docx-lite.
//!
//! Only the raw text is kept; formatting, numbering, and styles are discarded.

use crate::error::{BidscopeError, Result};

/// Extract raw text from DOCX bytes.
///
/// Any failure to read the ZIP container or its XML surfaces as a `Decode`
/// error for `file_name`.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    docx_lite::extract_text_from_bytes(bytes)
        .map_err(|e| BidscopeError::decode(file_name, format!("DOCX text extraction failed: {}", e)))
}
