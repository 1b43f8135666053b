//! Format-specific text extraction.
//!
//! One module per [`DocumentFormat`](crate::core::mime::DocumentFormat) variant.
//! Each handler turns raw bytes into plain text and reports failures as
//! `Decode` errors carrying the file name.

pub mod docx;
pub mod excel;
pub mod pdf;
pub mod text;
