//! Stable, user-facing error categories.
//!
//! Provider and transport failures arrive in many shapes (structured API errors, bare HTTP
//! statuses, connection resets). Callers only ever see one of the categories below.
//!
//! | Code  | Category            | Meaning                                      |
//! |-------|---------------------|----------------------------------------------|
//! | Q1001 | `missing_credential` | No API key has been configured              |
//! | Q1002 | `auth_rejected`      | Provider rejected the key                   |
//! | Q1003 | `context_too_large`  | Input exceeds the model's context window    |
//! | Q2001 | `rate_limited`       | Provider throttled the request              |
//! | Q3001 | `network_failure`    | Timeout, DNS, connect or fetch failure      |
//! | Q4001 | `aborted`            | Caller cancelled the request                |
//! | Q9999 | `unknown`            | Anything else                               |
//!
//! ## Example
//!
//! ```rust
//! use quillstream::error_code::ErrorCategory;
//!
//! let category = ErrorCategory::from_http_status(429);
//! assert_eq!(category, Some(ErrorCategory::RateLimited));
//! assert_eq!(ErrorCategory::RateLimited.code(), "Q2001");
//! assert!(ErrorCategory::Aborted.is_silent());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Q1001: the credential source returned nothing
    MissingCredential,
    /// Q1002: the provider reported an authentication failure
    AuthRejected,
    /// Q2001: the provider reported rate limiting
    RateLimited,
    /// Q1003: the request exceeded the model's context or token limits
    ContextTooLarge,
    /// Q3001: the request never reached the provider or timed out
    NetworkFailure,
    /// Q4001: the caller cancelled the request
    Aborted,
    /// Q9999: not classifiable
    Unknown,
}

impl ErrorCategory {
    /// Returns the canonical code string (e.g., `"Q1002"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Q1001",
            Self::AuthRejected => "Q1002",
            Self::ContextTooLarge => "Q1003",
            Self::RateLimited => "Q2001",
            Self::NetworkFailure => "Q3001",
            Self::Aborted => "Q4001",
            Self::Unknown => "Q9999",
        }
    }

    /// Returns the snake_case name (e.g., `"rate_limited"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::AuthRejected => "auth_rejected",
            Self::RateLimited => "rate_limited",
            Self::ContextTooLarge => "context_too_large",
            Self::NetworkFailure => "network_failure",
            Self::Aborted => "aborted",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the category is a user-initiated stop that should not be shown as a failure.
    #[inline]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Maps a provider error `code` or `type` string to a category.
    ///
    /// Matching is case-insensitive so Gemini-style statuses (`RESOURCE_EXHAUSTED`) share
    /// the table with OpenAI-style codes. Only codes with an unambiguous meaning are
    /// recognised; anything else yields `None` so later text-based rules still get a chance.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let lowered = provider_code.to_ascii_lowercase();
        let category = match lowered.as_str() {
            "user_abort" | "aborted" | "cancelled" | "canceled" => Self::Aborted,
            "invalid_api_key" | "authentication_error" | "authentication" | "unauthorized"
            | "unauthenticated" => {
                Self::AuthRejected
            }
            "rate_limit_exceeded" | "rate_limited" | "rate_limit_error" | "resource_exhausted" => {
                Self::RateLimited
            }
            "context_length_exceeded" | "request_too_large" | "string_above_max_length" => {
                Self::ContextTooLarge
            }
            _ => return None,
        };
        Some(category)
    }

    /// Maps an HTTP status to a category where the status alone is conclusive.
    pub fn from_http_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::AuthRejected),
            413 => Some(Self::ContextTooLarge),
            429 => Some(Self::RateLimited),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
