//! # Error Handling
//!
//! Structured errors for the ID photo studio. Every error carries a category,
//! an [`ErrorContext`] with operation/context metadata, and an optional recovery
//! suggestion that the CLI prints next to the user notice.
//!
//! ## Usage
//!
//! ```rust
//! use pixelperfect_id::error::{StudioError, HasRecoverySuggestion};
//!
//! let error = StudioError::validation("width", "must be a positive integer", "abc")
//!     .with_operation("custom_resize")
//!     .with_recovery_suggestion("Enter whole numbers greater than zero");
//!
//! assert_eq!(error.category(), "validation");
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Input mistakes the user can correct and retry
    Warning,
    /// Errors that abort the current action but leave the session usable
    Error,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for mistakes the user can fix and retry.
    pub fn correctable() -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            ..Self::default()
        }
    }
}

/// Base error type for the studio
#[derive(Debug)]
pub enum StudioError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Input bytes could not be decoded as an image
    Decode {
        source_name: String,
        reason: String,
        context: ErrorContext,
    },
    /// Geometry or rasterization failures
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// JPEG encoding failures
    Encoding {
        format: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// User input validation errors
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// Action not valid in the current session state
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Network errors talking to the vision model
    Network {
        operation: String,
        status: Option<u16>,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// Missing or rejected credentials
    Auth {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
}

impl StudioError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a decode error
    pub fn decode(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encoding error
    pub fn encoding(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            format: format.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error tied to a path
    pub fn io_at(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: Some(path.into()),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::correctable(),
        }
    }

    /// Create a state error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::correctable(),
        }
    }

    /// Create a network error
    pub fn network(operation: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            status: None,
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create a network error for a non-success HTTP status
    pub fn http_status(operation: impl Into<String>, status: u16) -> Self {
        Self::Network {
            operation: operation.into(),
            status: Some(status),
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create an authentication error
    pub fn auth(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Auth {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Auth { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Auth { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Decode { .. } => "decode",
            Self::Processing { .. } => "processing",
            Self::Encoding { .. } => "encoding",
            Self::Io { .. } => "io",
            Self::Validation { .. } => "validation",
            Self::State { .. } => "state",
            Self::Network { .. } => "network",
            Self::Auth { .. } => "auth",
        }
    }

    /// Short notice shown to the user in place of the detailed message.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "Failed to load image",
            Self::Processing { .. } | Self::Encoding { .. } => "Failed to process image",
            Self::Validation { .. } => "Please enter valid dimensions",
            Self::State { .. } => "Upload a photo first",
            Self::Io { .. } => "Failed to save image",
            Self::Network { .. } | Self::Auth { .. } => {
                "Failed to analyze image. Please try again later."
            }
            Self::Config { .. } => "Something went wrong",
        }
    }
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            StudioError::Decode {
                source_name,
                reason,
                ..
            } => {
                write!(f, "Could not decode '{}' as an image: {}", source_name, reason)
            }
            StudioError::Processing {
                operation, reason, ..
            } => {
                write!(f, "Processing failed during {}: {}", operation, reason)
            }
            StudioError::Encoding { format, reason, .. } => {
                write!(f, "Encoding {} failed: {}", format, reason)
            }
            StudioError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            StudioError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {})",
                    field, constraint, value
                )
            }
            StudioError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Cannot {} while {}: {}",
                    attempted_operation, current_state, reason
                )
            }
            StudioError::Network {
                operation,
                status,
                source,
                ..
            } => match (status, source) {
                (Some(code), _) => write!(f, "Network error during {}: HTTP {}", operation, code),
                (None, Some(source)) => write!(f, "Network error during {}: {}", operation, source),
                (None, None) => write!(f, "Network error during {}", operation),
            },
            StudioError::Auth {
                operation, reason, ..
            } => {
                write!(f, "Authentication error during {}: {}", operation, reason)
            }
        }
    }
}

impl StdError for StudioError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type StudioResult<T> = Result<T, StudioError>;

/// Trait for errors with severity levels
pub trait HasSeverity {
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for StudioError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for StudioError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<std::io::Error> for StudioError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<image::ImageError> for StudioError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => Self::io("image", e),
            image::ImageError::Encoding(e) => Self::encoding("image", e.to_string()),
            other => Self::decode("image", other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network {
            operation: "vision_request".to_string(),
            status: error.status().map(|s| s.as_u16()),
            source: Some(Box::new(error)),
            context: ErrorContext::new(),
        }
    }
}

impl From<ppid_scale::plan::PlanError> for StudioError {
    fn from(error: ppid_scale::plan::PlanError) -> Self {
        Self::processing("build_plan", error.to_string())
    }
}

impl From<ppid_scale::cpu::RenderError> for StudioError {
    fn from(error: ppid_scale::cpu::RenderError) -> Self {
        Self::processing("rasterize", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = StudioError::config("jpeg_quality", "0", "must be between 1 and 100");
        assert_eq!(error.category(), "config");
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_user_mistakes_are_warnings() {
        let invalid = StudioError::validation("width", "must be a positive integer", "0");
        assert_eq!(invalid.severity(), ErrorSeverity::Warning);
        let early = StudioError::state("no photo is loaded", "reset", "nothing to work on");
        assert_eq!(early.severity(), ErrorSeverity::Warning);
        let broken = StudioError::processing("rasterize", "canvas unavailable");
        assert_eq!(broken.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_with_context() {
        let error = StudioError::processing("rasterize", "canvas unavailable")
            .with_context("rendering 295x413 crop")
            .with_recovery_suggestion("try a different preset")
            .with_severity(ErrorSeverity::Warning);

        assert_eq!(error.category(), "processing");
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert_eq!(error.recovery_suggestion(), Some("try a different preset"));
        assert_eq!(
            error.context().context.as_deref(),
            Some("rendering 295x413 crop")
        );
    }

    #[test]
    fn test_user_notices() {
        assert_eq!(
            StudioError::decode("a.bin", "unknown format").user_notice(),
            "Failed to load image"
        );
        assert_eq!(
            StudioError::validation("width", "positive", "-1").user_notice(),
            "Please enter valid dimensions"
        );
        assert_eq!(
            StudioError::processing("rasterize", "x").user_notice(),
            "Failed to process image"
        );
    }

    #[test]
    fn test_plan_error_conversion() {
        let err: StudioError = ppid_scale::plan::TargetSpec::new(
            0,
            1,
            ppid_scale::plan::ResizeMode::Stretch,
        )
        .unwrap_err()
        .into();
        assert_eq!(err.category(), "processing");
        assert!(err.to_string().contains("0x1"));
    }

    #[test]
    fn test_io_source_chain() {
        let err = StudioError::io_at(
            "download",
            "/nope/out.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope/out.jpg"));
    }
}
