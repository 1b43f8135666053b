//! Bidscope - Structured Extraction for Government Bid Solicitations
//!
//! Bidscope turns uploaded solicitation documents (PDF, DOCX, XLSX/XLS, plain
//! text, Markdown) into text, builds a constrained extraction request for a
//! language model, and validates the model's JSON answer into a typed
//! [`BidAnalysis`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bidscope::{
//!     AggregatedInput, BidscopeConfig, ExtractionClient, GeminiCapability, RequestBuilder,
//! };
//!
//! # async fn example() -> bidscope::Result<()> {
//! let config = BidscopeConfig::discover()?.unwrap_or_default();
//! let client = ExtractionClient::new(GeminiCapability::from_config(&config)?);
//!
//! let request = RequestBuilder::new().build(&AggregatedInput::Text("RFQ 24-117 ...".into()))?;
//! let analysis = client.submit(&request).await?;
//! println!("Relevant: {:?}", analysis.relevance_analysis.is_relevant);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): format resolution, decoding, batch aggregation, config loading
//! - **Extraction** (`extraction`): one text extractor per supported format
//! - **Analysis** (`analysis`): policy, schema, request building, capability seam, response parsing
//! - **Session** (`session`): input/request state machine driving one analysis cycle at a time
//! - **Export** (`export`): JSON and line-item CSV output

#![deny(unsafe_code)]

pub mod analysis;
pub mod core;
pub mod error;
pub mod export;
pub mod extraction;
pub mod session;
pub mod types;

pub use error::{BidscopeError, DecodeFailure, ErrorKind, Result};
pub use types::*;

pub use core::aggregator::{AggregationOutcome, aggregate, aggregate_sync, combine_documents};
pub use core::config::BidscopeConfig;
pub use core::decoder::decode;
pub use core::mime::{
    DOCX_MIME_TYPE, DocumentFormat, EXCEL_BINARY_MIME_TYPE, EXCEL_MIME_TYPE, MARKDOWN_MIME_TYPE, PDF_MIME_TYPE,
    PLAIN_TEXT_MIME_TYPE,
};

pub use analysis::{
    ExtractionCapability, ExtractionClient, ExtractionRequest, GeminiCapability, RequestBuilder, RequestContent,
    bid_analysis_schema, parse_response,
};
pub use session::{AnalyzeOptions, InputState, RequestState, Session, SessionEvent};
