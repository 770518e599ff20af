//! # Studio Configuration
//!
//! Configuration shared by the CLI, the interactive shell and the library.
//! Values come from the environment at startup and may be overridden by CLI
//! flags before [`StudioConfig::validate`] runs.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Source | Default | Description |
//! |-----------|--------|---------|-------------|
//! | `credential` | `GEMINI_API_KEY`, then `API_KEY` | absent | Vision model API key |
//! | `model` | `PPID_MODEL` | `gemini-2.5-flash-image` | Model used for critiques |
//! | `endpoint` | `PPID_ENDPOINT` | Gemini v1beta | REST base URL |
//! | `request_timeout` | `PPID_REQUEST_TIMEOUT_SECS` | none | Critique request timeout |
//! | `output_dir` | `--out` | `.` | Where downloads are written |
//! | `file_prefix` | | `pixelperfect-id` | Download file name prefix |
//! | `jpeg_quality` | | 95 | JPEG quality for rendered output |
//!
//! A missing credential is not an error: critiques degrade to a placeholder
//! message instead.
//!
//! ## Examples
//!
//! ```rust
//! use pixelperfect_id::config::{Credential, StudioConfig};
//!
//! let config = StudioConfig::from_lookup(|key| match key {
//!     "API_KEY" => Some("secret".to_string()),
//!     _ => None,
//! });
//! assert!(config.credential.is_present());
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FILE_PREFIX: &str = "pixelperfect-id";
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Environment variables consulted for the API key, in priority order.
pub const CREDENTIAL_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// API key for the vision model, or its explicit absence.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credential {
    Present(String),
    #[default]
    Absent,
}

impl Credential {
    /// Blank and whitespace-only keys count as absent.
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Credential::Present(v.trim().to_string()),
            _ => Credential::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Credential::Present(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Credential::Present(key) => Some(key),
            Credential::Absent => None,
        }
    }
}

// Never print the key itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Present(_) => f.write_str("Credential::Present(<redacted>)"),
            Credential::Absent => f.write_str("Credential::Absent"),
        }
    }
}

/// Configuration for a studio session.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Vision model API key.
    pub credential: Credential,

    /// Model name inserted into the `generateContent` URL.
    pub model: String,

    /// REST base URL without a trailing slash.
    pub endpoint: String,

    /// Optional timeout for critique requests. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// Directory downloads are written into. Must exist when saving.
    pub output_dir: PathBuf,

    /// Download file names are `<file_prefix>-<unix millis>.jpg`.
    pub file_prefix: String,

    /// JPEG quality for rendered images, 1-100.
    pub jpeg_quality: u8,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Absent,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl StudioConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.credential = CREDENTIAL_VARS
            .iter()
            .map(|key| Credential::from_option(lookup(key)))
            .find(Credential::is_present)
            .unwrap_or_default();

        if let Some(model) = lookup("PPID_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(endpoint) = lookup("PPID_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        match lookup("PPID_REQUEST_TIMEOUT_SECS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.request_timeout = Some(Duration::from_secs(secs)),
            Some(_) => log::warn!("⚠️ Ignoring invalid PPID_REQUEST_TIMEOUT_SECS"),
            None => {}
        }

        config
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model name must not be empty".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!("Endpoint must be an http(s) URL: {}", self.endpoint));
        }
        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err("File prefix must be a plain file name".to_string());
        }
        Ok(())
    }
}
