use crate::error_code::ErrorCategory;
use std::sync::Arc;
use thiserror::Error;

/// Structured error context for configuration and setup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "client_cache")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw error raised anywhere inside the generation pipeline.
///
/// These are never handed to callers of [`crate::Generator`] directly; they are classified
/// into a [`ClassifiedError`] first.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    MissingCredential,

    #[error("request cancelled by caller")]
    Cancelled,

    /// Error reported by the provider, either as an HTTP error body or as an error frame
    /// inside a stream. Every field is optional: providers populate them inconsistently.
    #[error("Provider error{}: {}", format_status(.status), .message.as_deref().unwrap_or("<no message>"))]
    Provider {
        status: Option<u16>,
        code: Option<String>,
        kind: Option<String>,
        message: Option<String>,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" (HTTP {})", s),
        None => String::new(),
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Build a provider error from an OpenAI-style error body (`{"error": {...}}`).
    ///
    /// Bodies that are not JSON, or JSON without an `error` object, keep the raw text as the
    /// message so nothing the provider said is lost.
    pub fn from_provider_body(status: Option<u16>, body: &str) -> Self {
        let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
        match json.as_ref().and_then(|v| v.get("error")) {
            Some(err) => Self::from_provider_value(status, err),
            None => Error::Provider {
                status,
                code: None,
                kind: None,
                message: (!body.trim().is_empty()).then(|| body.trim().to_string()),
            },
        }
    }

    /// Build a provider error from the `error` member of a response or stream frame.
    pub fn from_provider_value(status: Option<u16>, err: &serde_json::Value) -> Self {
        // `code` is a string for OpenAI, a number for some proxies.
        let code = err.get("code").and_then(|c| match c {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let status = status.or_else(|| {
            err.get("code")
                .and_then(|c| c.as_u64())
                .and_then(|n| u16::try_from(n).ok())
        });
        let kind = err
            .get("type")
            .or_else(|| err.get("status"))
            .and_then(|t| t.as_str())
            .map(|s| s.to_string());
        let message = match err {
            serde_json::Value::String(s) => Some(s.clone()),
            _ => err
                .get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string()),
        };
        Error::Provider {
            status,
            code,
            kind,
            message,
        }
    }
}

/// A failure normalised into one of the stable [`ErrorCategory`] values.
///
/// `message` is ready to show to a user. `Aborted` should be treated as a silent stop.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
    #[source]
    pub original: Arc<Error>,
}

impl ClassifiedError {
    pub fn is_aborted(&self) -> bool {
        self.category == ErrorCategory::Aborted
    }
}

/// Two classified errors are equal when they carry the same category and message; the
/// original error is provenance only.
impl PartialEq for ClassifiedError {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.message == other.message
    }
}

impl Eq for ClassifiedError {}
