//! Document ingestion.
//!
//! This module turns uploaded files into the text an extraction request is
//! built from:
//! - **Format resolution** (`mime`): declared MIME type first, file extension second
//! - **Decoding** (`decoder`): one handler per resolved format
//! - **Aggregation** (`aggregator`): concurrent batch decode with per-file failures
//! - **Configuration** (`config`): model, credential variable, and concurrency settings
//!
//! # Example
//!
//! ```rust
//! use bidscope::core::aggregator::aggregate_sync;
//! use bidscope::{BidscopeConfig, UploadedDocument};
//!
//! let files = vec![
//!     UploadedDocument::new("a.txt", "Hello".as_bytes(), "text/plain"),
//!     UploadedDocument::new("b.txt", "World".as_bytes(), "text/plain"),
//! ];
//! let outcome = aggregate_sync(files, &BidscopeConfig::default());
//! assert!(outcome.failures.is_empty());
//! assert!(outcome.combined_text().unwrap().contains("--- START OF DOCUMENT: b.txt ---"));
//! ```

pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod mime;

pub use aggregator::{AggregationOutcome, aggregate, aggregate_sync, combine_documents};
pub use config::BidscopeConfig;
pub use decoder::decode;
pub use mime::DocumentFormat;
