//! Error classification logic
//!
//! Maps any raw [`Error`] onto an [`ErrorCategory`] through an ordered rule table. The first
//! rule that matches wins:
//!
//! 1. missing credential
//! 2. caller cancellation, or a provider-reported user abort
//! 3. provider authentication failure (401, `invalid_api_key`, ...)
//! 4. provider rate limiting (429, `rate_limit_exceeded`, ...)
//! 5. token / context-length indicators (413, `context_length_exceeded`, message text)
//! 6. network, timeout or fetch-failure indicators (transport kind, message text)
//! 7. anything else is `Unknown`, message passed through verbatim
//!
//! Classification only reads the error; it never allocates a secondary error and never
//! panics, so a partially-populated provider error degrades to `Unknown` at worst.

use crate::error::{ClassifiedError, Error};
use crate::error_code::ErrorCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static CONTEXT_INDICATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)token|context_length_exceeded|context length|context window")
        .expect("context indicator pattern is valid")
});

static NETWORK_INDICATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)network|timeout|timed out|fetch failed|connection (refused|reset|closed)")
        .expect("network indicator pattern is valid")
});

struct Rule {
    category: ErrorCategory,
    matches: fn(&Error) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        category: ErrorCategory::MissingCredential,
        matches: is_missing_credential,
    },
    Rule {
        category: ErrorCategory::Aborted,
        matches: is_aborted,
    },
    Rule {
        category: ErrorCategory::AuthRejected,
        matches: is_auth_rejected,
    },
    Rule {
        category: ErrorCategory::RateLimited,
        matches: is_rate_limited,
    },
    Rule {
        category: ErrorCategory::ContextTooLarge,
        matches: is_context_too_large,
    },
    Rule {
        category: ErrorCategory::NetworkFailure,
        matches: is_network_failure,
    },
];

fn is_missing_credential(e: &Error) -> bool {
    matches!(e, Error::MissingCredential)
}

fn is_aborted(e: &Error) -> bool {
    matches!(e, Error::Cancelled) || provider_reports(e, ErrorCategory::Aborted)
}

fn is_auth_rejected(e: &Error) -> bool {
    status_is(e, ErrorCategory::AuthRejected) || provider_reports(e, ErrorCategory::AuthRejected)
}

fn is_rate_limited(e: &Error) -> bool {
    status_is(e, ErrorCategory::RateLimited) || provider_reports(e, ErrorCategory::RateLimited)
}

fn is_context_too_large(e: &Error) -> bool {
    status_is(e, ErrorCategory::ContextTooLarge)
        || provider_reports(e, ErrorCategory::ContextTooLarge)
        || CONTEXT_INDICATORS.is_match(&message_text(e))
}

fn is_network_failure(e: &Error) -> bool {
    is_transport_failure(e) || NETWORK_INDICATORS.is_match(&message_text(e))
}

/// Determine the category of a raw error.
pub fn categorize(raw: &Error) -> ErrorCategory {
    RULES
        .iter()
        .find(|rule| (rule.matches)(raw))
        .map(|rule| rule.category)
        .unwrap_or(ErrorCategory::Unknown)
}

/// Classify a raw error into a user-facing [`ClassifiedError`].
///
/// Pure: the same input always yields an equal output.
pub fn classify(raw: Arc<Error>) -> ClassifiedError {
    let category = categorize(&raw);
    let message = user_message(category, &raw);
    ClassifiedError {
        category,
        message,
        original: raw,
    }
}

impl From<Error> for ClassifiedError {
    fn from(raw: Error) -> Self {
        classify(Arc::new(raw))
    }
}

fn user_message(category: ErrorCategory, raw: &Error) -> String {
    match category {
        ErrorCategory::MissingCredential => {
            "API key not configured; add an API key in settings".to_string()
        }
        ErrorCategory::Aborted => "Generation stopped".to_string(),
        ErrorCategory::AuthRejected => format!(
            "Authentication failed: {}; check that your API key and API base URL are correct",
            provider_detail(raw)
        ),
        ErrorCategory::RateLimited => format!(
            "Too many requests: {}; please try again later",
            provider_detail(raw)
        ),
        ErrorCategory::ContextTooLarge => {
            "Content exceeds the model's length limit; try shortening the input".to_string()
        }
        ErrorCategory::NetworkFailure => {
            "Network error; check your connection or the API base URL and try again".to_string()
        }
        ErrorCategory::Unknown => raw.to_string(),
    }
}

fn provider_detail(raw: &Error) -> String {
    match raw {
        Error::Provider {
            status, message, ..
        } => {
            let text = message.as_deref().unwrap_or("no details from provider");
            match status {
                Some(s) => format!("{} (status {})", text, s),
                None => text.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn status_is(raw: &Error, category: ErrorCategory) -> bool {
    match raw {
        Error::Provider {
            status: Some(s), ..
        } => ErrorCategory::from_http_status(*s) == Some(category),
        Error::Transport(e) => e
            .status()
            .and_then(|s| ErrorCategory::from_http_status(s.as_u16()))
            == Some(category),
        _ => false,
    }
}

fn provider_reports(raw: &Error, category: ErrorCategory) -> bool {
    match raw {
        Error::Provider { code, kind, .. } => [code, kind]
            .into_iter()
            .flatten()
            .any(|c| ErrorCategory::from_provider_code(c) == Some(category)),
        _ => false,
    }
}

fn is_transport_failure(raw: &Error) -> bool {
    match raw {
        Error::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
        _ => false,
    }
}

fn message_text(raw: &Error) -> String {
    match raw {
        Error::Provider {
            code, message, ..
        } => {
            let mut text = message.clone().unwrap_or_default();
            if let Some(c) = code {
                text.push(' ');
                text.push_str(c);
            }
            text
        }
        other => other.to_string(),
    }
}
