//! PDF text extraction using lopdf.
//!
//! Text is read page by page in page order. Within a page, every text-showing
//! operator (`Tj`, `TJ`, `'`, `"`) yields one fragment, decoded with the
//! encoding of the active font, and the fragments are joined with single
//! spaces in content-stream order. Each page is followed by a blank line.
//! There is no OCR: a scanned, image-only PDF produces empty text rather than
//! an error.

use crate::error::{BidscopeError, Result};
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;

/// Separator appended after every page.
pub const PAGE_BREAK: &str = "\n\n";

/// `TJ` kerning adjustments below this value (thousandths of an em) are read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -100.0;

pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| BidscopeError::decode(file_name, format!("Failed to parse PDF: {}", e)))?;

    let pages = document.get_pages();
    tracing::debug!(file = file_name, page_count = pages.len(), "Loaded PDF document");

    let mut content = String::new();
    for (page_number, page_id) in &pages {
        let fragments = page_fragments(&document, *page_id).map_err(|e| {
            let message = if document.is_encrypted() {
                "PDF is encrypted and cannot be read".to_string()
            } else {
                format!("Failed to read text on page {}: {}", page_number, e)
            };
            BidscopeError::decode(file_name, message)
        })?;

        content.push_str(&fragments.join(" "));
        content.push_str(PAGE_BREAK);
    }

    Ok(content)
}

/// Collect the text fragments of one page, one per text-showing operator.
fn page_fragments(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, Encoding<'_>> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                tracing::debug!(font = %String::from_utf8_lossy(&name), error = %e, "Font has no usable encoding");
                None
            }
        })
        .collect();

    let content = document.get_and_decode_page_content(page_id)?;

    let mut fragments = Vec::new();
    let mut encoding: Option<&Encoding<'_>> = None;
    for operation in &content.operations {
        let shown = match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| encodings.get(name));
                continue;
            }
            "Tj" | "TJ" | "'" => operation.operands.as_slice(),
            // aw ac string
            "\"" => operation.operands.get(2..).unwrap_or_default(),
            _ => continue,
        };

        let Some(encoding) = encoding else {
            tracing::debug!(operator = %operation.operator, "Text shown without a decodable font");
            continue;
        };

        let mut fragment = String::new();
        collect_shown_text(&mut fragment, encoding, shown)?;
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            fragments.push(fragment.to_string());
        }
    }

    Ok(fragments)
}

fn collect_shown_text(text: &mut String, encoding: &Encoding<'_>, operands: &[Object]) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => collect_shown_text(text, encoding, items)?,
            Object::Integer(adjustment) if (*adjustment as f32) < TJ_SPACE_THRESHOLD => text.push(' '),
            Object::Real(adjustment) if *adjustment < TJ_SPACE_THRESHOLD => text.push(' '),
            _ => {}
        }
    }
    Ok(())
}
