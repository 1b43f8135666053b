//! Gemini `generateContent` capability over HTTP.

use crate::analysis::client::ExtractionCapability;
use crate::core::config::BidscopeConfig;
use crate::types::InlinePayload;
use crate::{BidscopeError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Build the JSON body of a `generateContent` call.
///
/// The prompt is the first part; an inline payload, when present, follows as
/// base64 data with its MIME type.
pub fn build_request_body(prompt: &str, schema: &Value, payload: Option<&InlinePayload>) -> Result<Value> {
    let mut parts = vec![RequestPart::Text { text: prompt }];
    if let Some(payload) = payload {
        parts.push(RequestPart::InlineData {
            inline_data: InlineData {
                mime_type: &payload.mime_type,
                data: STANDARD.encode(&payload.data),
            },
        });
    }

    let body = GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME_TYPE,
            response_schema: schema,
        },
    };

    Ok(serde_json::to_value(&body)?)
}

/// Pull the concatenated text of the first candidate out of a response body.
///
/// # Errors
///
/// Returns `Capability` when the prompt was blocked or no candidate carries text.
pub fn extract_candidate_text(body: &Value) -> Result<String> {
    let response = GenerateContentResponse::deserialize(body)
        .map_err(|e| BidscopeError::capability_with_source("Unexpected response envelope", e))?;

    if let Some(reason) = response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        return Err(BidscopeError::capability(format!("Prompt was blocked: {}", reason)));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(BidscopeError::capability("Response contained no candidates"));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(BidscopeError::capability(format!(
            "Response contained no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

/// HTTP capability backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiCapability {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiCapability")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiCapability {
    /// Create a capability with an explicit credential.
    pub fn new(api_key: impl Into<String>, config: &BidscopeConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| BidscopeError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a capability reading the credential from the environment.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when no credential is set; no request is attempted.
    pub fn from_config(config: &BidscopeConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(api_key, config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ExtractionCapability for GeminiCapability {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn submit_extraction(
        &self,
        prompt: &str,
        schema: &Value,
        payload: Option<&InlinePayload>,
    ) -> Result<String> {
        let start = Instant::now();
        let body = build_request_body(prompt, schema, payload)?;

        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(BidscopeError::capability(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                self.model,
                error_text
            )));
        }

        let body: Value = response.json().await?;
        let text = extract_candidate_text(&body)?;

        tracing::debug!(
            model = %self.model,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            inline = payload.is_some(),
            "Gemini generateContent"
        );

        Ok(text)
    }
}
