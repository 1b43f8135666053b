//! Per-user analysis session.
//!
//! A [`Session`] owns the current input and the state of the extraction
//! request. Every change goes through [`Session::apply`], which enforces:
//!
//! - pasted text and attached files are mutually exclusive;
//! - at most one request is in flight, and input is frozen while it runs;
//! - a stored analysis is only replaced by a newer successful one.

use crate::analysis::client::ExtractionClient;
use crate::analysis::request::RequestBuilder;
use crate::core::aggregator::aggregate;
use crate::core::config::BidscopeConfig;
use crate::core::mime::DocumentFormat;
use crate::error::DecodeFailure;
use crate::types::{AggregatedInput, BidAnalysis, UploadedDocument};
use crate::{BidscopeError, Result};
use chrono::NaiveDate;
use std::sync::Arc;

/// What the user has supplied for the next analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputState {
    #[default]
    Empty,
    TextEntered(String),
    FilesAttached(Vec<UploadedDocument>),
}

impl InputState {
    /// True when there is nothing that could be analyzed.
    pub fn is_empty(&self) -> bool {
        match self {
            InputState::Empty => true,
            InputState::TextEntered(text) => text.trim().is_empty(),
            InputState::FilesAttached(files) => files.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded(Arc<BidAnalysis>),
    Failed(Arc<BidscopeError>),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    EnterText(String),
    AttachFiles(Vec<UploadedDocument>),
    RemoveFile(String),
    ClearInput,
    BeginRequest,
    CompleteRequest(Result<BidAnalysis>),
}

/// Per-cycle options for [`Session::analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Send a single attached non-text file as raw bytes instead of decoding it.
    pub inline_single_file: bool,
    /// Deadline reference date; today (UTC) when unset.
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct Session {
    config: BidscopeConfig,
    input: InputState,
    request: RequestState,
    latest: Option<Arc<BidAnalysis>>,
    last_decode_failures: Vec<DecodeFailure>,
}

impl Session {
    pub fn new(config: BidscopeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &BidscopeConfig {
        &self.config
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    pub fn is_busy(&self) -> bool {
        self.request.is_in_flight()
    }

    /// The most recent successful analysis, kept across later failures.
    pub fn latest_analysis(&self) -> Option<&Arc<BidAnalysis>> {
        self.latest.as_ref()
    }

    /// Files that failed to decode during the last cycle that produced text.
    ///
    /// When every file fails, the failures travel inside the
    /// `NoDecodedDocuments` error instead.
    pub fn last_decode_failures(&self) -> &[DecodeFailure] {
        &self.last_decode_failures
    }

    /// Apply one transition.
    ///
    /// # Errors
    ///
    /// - `RequestInFlight` for input edits or a second `BeginRequest` while a request runs.
    /// - `EmptyInput` for `BeginRequest` without content.
    /// - `Validation` for `CompleteRequest` when no request is in flight.
    pub fn apply(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::EnterText(text) => {
                self.ensure_idle()?;
                if !text.is_empty() {
                    self.input = InputState::TextEntered(text);
                } else if matches!(self.input, InputState::TextEntered(_)) {
                    self.input = InputState::Empty;
                }
            }
            SessionEvent::AttachFiles(files) => {
                self.ensure_idle()?;
                if files.is_empty() {
                    return Ok(());
                }
                match &mut self.input {
                    InputState::FilesAttached(existing) => existing.extend(files),
                    _ => self.input = InputState::FilesAttached(files),
                }
            }
            SessionEvent::RemoveFile(name) => {
                self.ensure_idle()?;
                if let InputState::FilesAttached(files) = &mut self.input {
                    if let Some(position) = files.iter().position(|file| file.name == name) {
                        files.remove(position);
                    }
                    if files.is_empty() {
                        self.input = InputState::Empty;
                    }
                }
            }
            SessionEvent::ClearInput => {
                self.ensure_idle()?;
                self.input = InputState::Empty;
            }
            SessionEvent::BeginRequest => {
                self.ensure_idle()?;
                if self.input.is_empty() {
                    self.request = RequestState::Failed(Arc::new(BidscopeError::EmptyInput));
                    return Err(BidscopeError::EmptyInput);
                }
                self.last_decode_failures.clear();
                self.request = RequestState::InFlight;
            }
            SessionEvent::CompleteRequest(result) => {
                if !self.request.is_in_flight() {
                    return Err(BidscopeError::validation("No analysis request is in flight"));
                }
                self.request = match result {
                    Ok(analysis) => {
                        let analysis = Arc::new(analysis);
                        self.latest = Some(Arc::clone(&analysis));
                        RequestState::Succeeded(analysis)
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "Analysis cycle failed");
                        RequestState::Failed(Arc::new(error))
                    }
                };
            }
        }
        Ok(())
    }

    /// Run one full analysis cycle on the current input.
    ///
    /// Errors that end the cycle are also recorded as [`RequestState::Failed`],
    /// which is why they are returned shared. Dropping the returned future
    /// before it completes records a `Cancelled` failure, so the session
    /// accepts input again.
    pub async fn analyze(
        &mut self,
        client: &ExtractionClient,
        options: &AnalyzeOptions,
    ) -> std::result::Result<Arc<BidAnalysis>, Arc<BidscopeError>> {
        self.apply(SessionEvent::BeginRequest).map_err(Arc::new)?;
        let guard = InFlightGuard { session: self };

        let result = guard.session.run_cycle(client, options).await;
        guard
            .session
            .apply(SessionEvent::CompleteRequest(result))
            .map_err(Arc::new)?;

        match &guard.session.request {
            RequestState::Succeeded(analysis) => Ok(Arc::clone(analysis)),
            RequestState::Failed(error) => Err(Arc::clone(error)),
            RequestState::Idle | RequestState::InFlight => Err(Arc::new(BidscopeError::Other(
                "Analysis cycle ended without an outcome".to_string(),
            ))),
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.request.is_in_flight() {
            Err(BidscopeError::RequestInFlight)
        } else {
            Ok(())
        }
    }

    async fn run_cycle(&mut self, client: &ExtractionClient, options: &AnalyzeOptions) -> Result<BidAnalysis> {
        let mut builder = RequestBuilder::new();
        if let Some(date) = options.reference_date {
            builder = builder.with_reference_date(date);
        }

        let request = match &self.input {
            InputState::Empty => return Err(BidscopeError::EmptyInput),
            InputState::TextEntered(text) => builder.build(&AggregatedInput::Text(text.clone()))?,
            InputState::FilesAttached(files) if options.inline_single_file && is_single_binary(files) => {
                builder.build_for_file(&files[0])?
            }
            InputState::FilesAttached(files) => {
                let outcome = aggregate(files.clone(), &self.config).await;
                let (input, failures) = outcome.into_input()?;
                self.last_decode_failures = failures;
                builder.build(&input)?
            }
        };

        client.submit(&request).await
    }
}

/// Marks an abandoned in-flight request as cancelled.
struct InFlightGuard<'a> {
    session: &'a mut Session,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.session.request.is_in_flight() {
            tracing::warn!("Analysis request dropped before completion");
            self.session.request = RequestState::Failed(Arc::new(BidscopeError::Cancelled));
        }
    }
}

/// Exactly one attached file whose format is not plain text or Markdown.
fn is_single_binary(files: &[UploadedDocument]) -> bool {
    match files {
        [file] => !DocumentFormat::resolve(&file.name, &file.declared_type).is_ok_and(|format| format.is_text()),
        _ => false,
    }
}
