//! Configuration loading and management.
//!
//! [`BidscopeConfig`] can be loaded from TOML, YAML, or JSON files, discovered
//! as `bidscope.toml` in the current directory or one of its parents, or built
//! programmatically. Every field has a default, so an empty file is valid.
//!
//! The service credential itself is never stored in configuration; only the
//! name of the environment variable that holds it.

use crate::{BidscopeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Consulted when the configured variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const CONFIG_FILE_NAME: &str = "bidscope.toml";

/// Main configuration.
///
/// # Example
///
/// ```rust
/// use bidscope::BidscopeConfig;
///
/// let config = BidscopeConfig::default();
/// assert_eq!(config.model, "gemini-2.5-flash");
/// assert!(config.request_timeout_secs.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidscopeConfig {
    /// Model used by the extraction service
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the service credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the extraction service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout of the HTTP capability (None = no timeout)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Maximum concurrent decodes in one batch (None = num_cpus * 2)
    #[serde(default)]
    pub max_concurrent_decodes: Option<usize>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for BidscopeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            request_timeout_secs: None,
            max_concurrent_decodes: None,
        }
    }
}

impl BidscopeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `BidscopeError::Validation` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| BidscopeError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validated()
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| BidscopeError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validated()
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BidscopeError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validated()
    }

    /// Load configuration choosing the parser from the file extension.
    ///
    /// `.yaml`/`.yml` and `.json` are recognized; anything else is read as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `bidscope.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(BidscopeError::Io)?;
        Self::discover_from(&current)
    }

    /// Like [`discover`](Self::discover), starting from `start` instead of the
    /// current directory.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Discovered configuration file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }

    /// Effective decode concurrency for batch aggregation.
    pub fn decode_concurrency(&self) -> usize {
        self.max_concurrent_decodes.unwrap_or_else(|| num_cpus::get() * 2).max(1)
    }

    /// Read the service credential from the environment.
    ///
    /// # Errors
    ///
    /// Returns `BidscopeError::Configuration` when neither the configured
    /// variable nor the `API_KEY` fallback holds a non-empty value.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    /// Resolve the credential through an arbitrary variable lookup.
    pub fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                BidscopeError::Configuration(format!(
                    "API key is not configured: set {} in the environment",
                    self.api_key_env
                ))
            })
    }

    fn validated(self) -> Result<Self> {
        if self.model.trim().is_empty() {
            return Err(BidscopeError::validation("model must not be empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(BidscopeError::validation("api_key_env must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(BidscopeError::validation(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.max_concurrent_decodes == Some(0) {
            return Err(BidscopeError::validation("max_concurrent_decodes must be at least 1"));
        }
        Ok(self)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BidscopeError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
