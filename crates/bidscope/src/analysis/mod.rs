//! Extraction requests and responses.
//!
//! - `policy` and `schema`: the fixed instruction block and response contract
//! - `request`: builds text or inline-file requests
//! - `client`: the [`ExtractionCapability`] seam and the validating [`ExtractionClient`]
//! - `response`: strict JSON parsing into [`BidAnalysis`](crate::types::BidAnalysis)
//! - `gemini`: the HTTP capability

pub mod client;
pub mod gemini;
pub mod policy;
pub mod request;
pub mod response;
pub mod schema;

pub use client::{ExtractionCapability, ExtractionClient};
pub use gemini::GeminiCapability;
pub use request::{ExtractionRequest, RequestBuilder, RequestContent};
pub use response::parse_response;
pub use schema::bid_analysis_schema;
