//! Request shaping: caller messages and options into the provider's request body.

use crate::types::{Message, MessageRole};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Per-call generation options. Every field may be omitted.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Model id; the generator's default model is used when absent.
    pub model: Option<String>,
    /// Sampling temperature in `[0, 2]`, default 0.7.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens, default 4096.
    pub max_tokens: Option<u32>,
    /// Cooperative cancellation for the call.
    pub cancellation: Option<CancellationToken>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
    }
}

/// One message in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Body of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ProviderRequest {
    /// Set the transport mode. Only the orchestrator decides this; it does not change the
    /// payload otherwise.
    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Normalise messages and options into a [`ProviderRequest`] with streaming disabled.
///
/// Messages are mapped one-to-one, in order, with no filtering.
pub fn build(messages: &[Message], options: &GenerationOptions, default_model: &str) -> ProviderRequest {
    let model = options
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(default_model)
        .to_string();

    let temperature = match options.temperature {
        None => DEFAULT_TEMPERATURE,
        Some(t) if t.is_nan() => {
            warn!("temperature is NaN, using default {}", DEFAULT_TEMPERATURE);
            DEFAULT_TEMPERATURE
        }
        Some(t) if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t) => {
            let clamped = t.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
            warn!(requested = t, clamped, "temperature out of range, clamping");
            clamped
        }
        Some(t) => t,
    };

    let max_tokens = match options.max_tokens {
        None => DEFAULT_MAX_TOKENS,
        Some(0) => {
            warn!("max_tokens must be positive, using default {}", DEFAULT_MAX_TOKENS);
            DEFAULT_MAX_TOKENS
        }
        Some(n) => n,
    };

    let messages: Vec<WireMessage> = messages
        .iter()
        .map(|m| WireMessage {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    debug!(
        model = model.as_str(),
        temperature,
        max_tokens,
        messages = messages.len(),
        "built provider request"
    );

    ProviderRequest {
        model,
        messages,
        temperature,
        max_tokens,
        stream: false,
    }
}
