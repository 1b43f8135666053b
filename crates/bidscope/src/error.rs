//! Error types for Bidscope.
//!
//! Every fallible operation in the crate returns [`BidscopeError`]. The variants
//! follow the failure taxonomy of the analysis pipeline:
//!
//! - Per-file failures (`UnsupportedFormat`, `Decode`) are collected by the
//!   aggregator as [`DecodeFailure`] records and never abort sibling files.
//! - Request-level failures (`EmptyInput`, `Configuration`, `InvalidResponse`,
//!   `Capability`) end the current analysis cycle.
//! - `Io` errors bubble up unchanged.
//!
//! # Example
//!
//! ```rust
//! use bidscope::{BidscopeError, ErrorKind};
//!
//! let err = BidscopeError::unsupported_format("notes.exe", "application/x-msdownload");
//! assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
//! assert!(err.to_string().contains("notes.exe"));
//! ```
use thiserror::Error;

/// Result type alias using `BidscopeError`.
pub type Result<T> = std::result::Result<T, BidscopeError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Bidscope operations.
#[derive(Debug, Error)]
pub enum BidscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file: {file_name}. Please upload a PDF, DOCX, XLSX, XLS, TXT, or MD file.")]
    UnsupportedFormat { file_name: String, declared_type: String },

    #[error("Failed to decode {file_name}: {message}")]
    Decode {
        file_name: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Please paste bid text or upload a file to analyze.")]
    EmptyInput,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("The model returned an invalid data structure ({message}). Please try again.")]
    InvalidResponse {
        message: String,
        raw: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Extraction service error: {message}")]
    Capability {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("An analysis request is already in progress")]
    RequestInFlight,

    #[error("The analysis request was cancelled before it completed")]
    Cancelled,

    #[error("None of the {} uploaded document(s) could be read", .failures.len())]
    NoDecodedDocuments { failures: Vec<DecodeFailure> },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{0}")]
    Other(String),
}

/// Fieldless discriminant of [`BidscopeError`], handy for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    UnsupportedFormat,
    Decode,
    EmptyInput,
    Configuration,
    InvalidResponse,
    Capability,
    RequestInFlight,
    Cancelled,
    NoDecodedDocuments,
    Validation,
    Serialization,
    Other,
}

/// A single file that could not be turned into text.
///
/// Produced by the aggregator; one record per failed file, in submission order.
#[derive(Debug)]
pub struct DecodeFailure {
    pub file_name: String,
    pub error: BidscopeError,
}

impl DecodeFailure {
    pub fn new(file_name: impl Into<String>, error: BidscopeError) -> Self {
        Self {
            file_name: file_name.into(),
            error,
        }
    }
}

impl std::fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.error)
    }
}

impl From<serde_json::Error> for BidscopeError {
    fn from(err: serde_json::Error) -> Self {
        BidscopeError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for BidscopeError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        BidscopeError::Capability {
            message,
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl BidscopeError {
    error_constructor!(capability, Capability);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    pub fn unsupported_format(file_name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            file_name: file_name.into(),
            declared_type: declared_type.into(),
        }
    }

    pub fn decode(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            file_name: file_name.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn decode_with_source<E: std::error::Error + Send + Sync + 'static>(
        file_name: impl Into<String>,
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Decode {
            file_name: file_name.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_response(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            raw: raw.into(),
            source: None,
        }
    }

    pub fn invalid_response_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        raw: impl Into<String>,
        source: E,
    ) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            raw: raw.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Capability { .. } => ErrorKind::Capability,
            Self::RequestInFlight => ErrorKind::RequestInFlight,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NoDecodedDocuments { .. } => ErrorKind::NoDecodedDocuments,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether resubmitting the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidResponse { .. } | Self::Capability { .. })
    }
}
