//! Parsing of raw capability output into [`BidAnalysis`].
//!
//! The raw text must be a single JSON object that satisfies the declared
//! schema. Nothing is coerced or backfilled: a missing required key is an
//! error even when its value would be allowed to be `null`.

use crate::types::BidAnalysis;
use crate::{BidscopeError, Result};

/// Parse the capability's raw text.
///
/// # Errors
///
/// Returns `InvalidResponse` carrying the raw text when it is not JSON or does
/// not match the expected shape.
pub fn parse_response(raw: &str) -> Result<BidAnalysis> {
    let trimmed = raw.trim();

    serde_json::from_str::<BidAnalysis>(trimmed).map_err(|e| {
        tracing::warn!(error = %e, "Rejected extraction response");
        tracing::debug!(raw = trimmed, "Rejected response text");
        BidscopeError::invalid_response_with_source(e.to_string(), trimmed, e)
    })
}
