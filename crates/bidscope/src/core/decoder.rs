//! File decoding entry point.
//!
//! [`decode`] resolves the [`DocumentFormat`] of an upload once and hands the
//! bytes to the matching handler in [`crate::extraction`].

use crate::Result;
use crate::core::mime::DocumentFormat;
use crate::extraction::{docx, excel, pdf, text};
use crate::types::{DecodedDocument, UploadedDocument};

/// Convert one uploaded file into plain text.
///
/// # Errors
///
/// - `UnsupportedFormat` when neither the declared MIME type nor the extension
///   matches a supported format.
/// - `Decode` when a recognized format fails to parse.
///
/// # Example
///
/// ```rust
/// use bidscope::{UploadedDocument, decode};
///
/// let file = UploadedDocument::new("notes.md", "# Bid 24-117".as_bytes(), "");
/// let decoded = decode(&file).unwrap();
/// assert_eq!(decoded.text, "# Bid 24-117");
/// ```
pub fn decode(document: &UploadedDocument) -> Result<DecodedDocument> {
    let format = DocumentFormat::resolve(&document.name, &document.declared_type)?;
    decode_as(document, format)
}

/// Decode an upload with an already resolved format.
pub fn decode_as(document: &UploadedDocument, format: DocumentFormat) -> Result<DecodedDocument> {
    let name = document.name.as_str();
    let bytes = document.bytes.as_slice();

    let text = match format {
        DocumentFormat::Pdf => pdf::extract_text(name, bytes)?,
        DocumentFormat::Docx => docx::extract_text(name, bytes)?,
        DocumentFormat::Spreadsheet => excel::extract_text(name, bytes)?,
        DocumentFormat::Text => text::decode_text(bytes),
    };

    tracing::debug!(
        file = name,
        format = %format,
        input_bytes = bytes.len(),
        text_len = text.len(),
        "Decoded document"
    );

    Ok(DecodedDocument {
        name: document.name.clone(),
        text,
    })
}
