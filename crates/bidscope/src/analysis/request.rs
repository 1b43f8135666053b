//! Extraction request construction.
//!
//! A request carries the policy (with its reference-date line), the content to
//! analyze, and the declared response schema. Content is either text (pasted
//! or aggregated from decoded documents) or a single raw file that bypasses
//! decoding entirely.

use crate::analysis::policy::{EXTRACTION_POLICY, reference_date_line};
use crate::analysis::schema::bid_analysis_schema;
use crate::types::{AggregatedInput, InlinePayload, UploadedDocument};
use crate::{BidscopeError, Result};
use chrono::{NaiveDate, Utc};
use serde_json::Value;

/// What the extraction capability is asked to analyze.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestContent {
    /// Text embedded into the prompt between bid-text markers.
    Text(String),
    /// Original file bytes sent next to the policy as an inline part.
    File(InlinePayload),
}

/// A fully built request, ready for [`ExtractionClient::submit`](crate::analysis::client::ExtractionClient::submit).
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub policy: String,
    pub content: RequestContent,
    pub schema: &'static Value,
}

impl ExtractionRequest {
    /// The prompt text sent to the capability.
    ///
    /// Text content is embedded after the policy; for a file request the
    /// prompt is the policy alone and the file travels as [`inline_payload`](Self::inline_payload).
    pub fn prompt(&self) -> String {
        match &self.content {
            RequestContent::Text(text) => {
                format!("{}\n\n--- BID TEXT ---\n{}\n--- END BID TEXT ---", self.policy, text)
            }
            RequestContent::File(_) => self.policy.clone(),
        }
    }

    pub fn inline_payload(&self) -> Option<&InlinePayload> {
        match &self.content {
            RequestContent::File(payload) => Some(payload),
            RequestContent::Text(_) => None,
        }
    }

    /// True when there is neither non-blank text nor file content to analyze.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            RequestContent::Text(text) => text.trim().is_empty(),
            RequestContent::File(payload) => payload.data.is_empty(),
        }
    }
}

/// Builds [`ExtractionRequest`]s against a fixed reference date.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    reference_date: NaiveDate,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Builder using the current UTC date as the deadline reference.
    pub fn new() -> Self {
        Self {
            reference_date: Utc::now().date_naive(),
        }
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Build a text request.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` when the input text is blank.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bidscope::analysis::request::RequestBuilder;
    /// use bidscope::AggregatedInput;
    ///
    /// let request = RequestBuilder::new()
    ///     .build(&AggregatedInput::Text("Exam tables, qty 4".to_string()))
    ///     .unwrap();
    /// assert!(request.prompt().ends_with("--- BID TEXT ---\nExam tables, qty 4\n--- END BID TEXT ---"));
    /// ```
    pub fn build(&self, input: &AggregatedInput) -> Result<ExtractionRequest> {
        if input.is_blank() {
            return Err(BidscopeError::EmptyInput);
        }

        let request = ExtractionRequest {
            policy: self.policy(),
            content: RequestContent::Text(input.text().to_string()),
            schema: bid_analysis_schema(),
        };

        let source = match input {
            AggregatedInput::Text(_) => "text",
            AggregatedInput::Documents(_) => "documents",
        };
        tracing::debug!(
            source,
            content_len = input.text().len(),
            reference_date = %self.reference_date,
            "Built text extraction request"
        );

        Ok(request)
    }

    /// Build a request that sends one file's original bytes.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` when the file has no content.
    pub fn build_for_file(&self, document: &UploadedDocument) -> Result<ExtractionRequest> {
        if document.bytes.is_empty() {
            return Err(BidscopeError::EmptyInput);
        }

        let payload = InlinePayload::from_document(document);
        tracing::debug!(
            file = %document.name,
            mime_type = %payload.mime_type,
            size = payload.data.len(),
            "Built inline-file extraction request"
        );

        Ok(ExtractionRequest {
            policy: self.policy(),
            content: RequestContent::File(payload),
            schema: bid_analysis_schema(),
        })
    }

    fn policy(&self) -> String {
        format!("{}\n\n{}", EXTRACTION_POLICY, reference_date_line(self.reference_date))
    }
}
