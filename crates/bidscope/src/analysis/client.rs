//! The extraction client and the capability seam it calls through.

use crate::analysis::response::parse_response;
use crate::analysis::request::ExtractionRequest;
use crate::types::{BidAnalysis, InlinePayload};
use crate::{BidscopeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// An external model that answers extraction requests with raw text.
///
/// Implementations handle transport only. Schema validation stays in
/// [`ExtractionClient`], so HTTP backends and test doubles are interchangeable.
#[async_trait]
pub trait ExtractionCapability: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Submit one request and return the model's raw text output.
    async fn submit_extraction(&self, prompt: &str, schema: &Value, payload: Option<&InlinePayload>)
    -> Result<String>;
}

/// Sends [`ExtractionRequest`]s and validates the answers.
#[derive(Clone)]
pub struct ExtractionClient {
    capability: Arc<dyn ExtractionCapability>,
}

impl std::fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionClient")
            .field("capability", &self.capability.name())
            .finish()
    }
}

impl ExtractionClient {
    pub fn new(capability: impl ExtractionCapability + 'static) -> Self {
        Self {
            capability: Arc::new(capability),
        }
    }

    pub fn from_arc(capability: Arc<dyn ExtractionCapability>) -> Self {
        Self { capability }
    }

    pub fn capability(&self) -> &Arc<dyn ExtractionCapability> {
        &self.capability
    }

    /// One round trip: submit, then parse the raw output.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` when the request has no content; nothing is sent.
    /// - `Capability` when the transport fails.
    /// - `InvalidResponse` when the output does not satisfy the schema.
    pub async fn submit(&self, request: &ExtractionRequest) -> Result<BidAnalysis> {
        if request.is_empty() {
            return Err(BidscopeError::EmptyInput);
        }

        let start = Instant::now();
        let prompt = request.prompt();
        let raw = self
            .capability
            .submit_extraction(&prompt, request.schema, request.inline_payload())
            .await
            .inspect_err(|e| {
                tracing::error!(capability = self.capability.name(), error = %e, "Extraction request failed");
            })?;

        tracing::info!(
            capability = self.capability.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = raw.len(),
            "Extraction response received"
        );

        parse_response(&raw)
    }
}
