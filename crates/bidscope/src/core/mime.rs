//! MIME type and extension resolution.
//!
//! An uploaded file is resolved to a [`DocumentFormat`] exactly once, at decode
//! entry. The declared MIME type is checked first, then the filename extension,
//! format by format in a fixed order (PDF, Word, spreadsheet, text).

use crate::{BidscopeError, Result};
use std::fmt;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// The four upload formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Spreadsheet,
    Text,
}

impl DocumentFormat {
    /// Resolve the format of a file from its declared MIME type and name.
    ///
    /// Returns `UnsupportedFormat` naming the file when neither matches.
    pub fn resolve(file_name: &str, declared_type: &str) -> Result<Self> {
        let name = file_name.to_lowercase();
        let mime = declared_type.trim().to_lowercase();
        let mime = mime.split(';').next().unwrap_or("").trim();

        let format = if mime == PDF_MIME_TYPE || name.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if mime == DOCX_MIME_TYPE || name.ends_with(".docx") {
            DocumentFormat::Docx
        } else if mime == EXCEL_MIME_TYPE
            || mime == EXCEL_BINARY_MIME_TYPE
            || name.ends_with(".xlsx")
            || name.ends_with(".xls")
        {
            DocumentFormat::Spreadsheet
        } else if mime.starts_with("text/") || name.ends_with(".md") {
            DocumentFormat::Text
        } else {
            return Err(BidscopeError::unsupported_format(file_name, declared_type));
        };

        tracing::debug!(file = file_name, declared_type, ?format, "Resolved document format");
        Ok(format)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Spreadsheet => "spreadsheet",
            DocumentFormat::Text => "text",
        }
    }

    /// Whether the format is already plain text.
    pub fn is_text(&self) -> bool {
        matches!(self, DocumentFormat::Text)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
