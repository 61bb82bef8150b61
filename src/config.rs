//! Generator configuration.
//!
//! Values come from [`GeneratorConfig::default`], optionally a YAML file, and finally
//! environment overrides:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QUILL_API_BASE` | `base_url` |
//! | `QUILL_DEFAULT_MODEL` | `default_model` |
//! | `QUILL_HTTP_TIMEOUT_SECS` | `timeout_secs` |
//! | `QUILL_FRAME_INTERVAL_MS` | `frame_interval_ms` |
//! | `QUILL_PROXY_URL` | `proxy` |
//!
//! ```rust
//! use quillstream::config::GeneratorConfig;
//!
//! let cfg = GeneratorConfig::from_yaml_str("default_model: gemini-2.5-pro-exp-03-25\n").unwrap();
//! assert_eq!(cfg.default_model, "gemini-2.5-pro-exp-03-25");
//! assert_eq!(cfg.timeout_secs, 60);
//! ```

use crate::error::ErrorContext;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// OpenAI-compatible endpoint serving the Gemini models.
///
/// The desktop app this crate grew out of pointed at a fixed relay,
/// `https://bin.24642698.xyz/v1`. Set `base_url` (or `QUILL_API_BASE`) to use a relay like that.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Provider base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model used when the caller does not pick one.
    pub default_model: String,
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Pacing tick, in milliseconds. 16 ms approximates a 60 Hz repaint.
    pub frame_interval_ms: u64,
    /// Optional HTTP(S) proxy for all provider traffic.
    pub proxy: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: crate::models::DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            frame_interval_ms: 16,
            proxy: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid generator config: {}", e),
                ErrorContext::new().with_source("config_loader"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Apply `QUILL_*` environment overrides. Unparseable numeric values are ignored.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base) = env::var("QUILL_API_BASE") {
            self.base_url = base;
        }
        if let Ok(model) = env::var("QUILL_DEFAULT_MODEL") {
            if !model.trim().is_empty() {
                self.default_model = model;
            }
        }
        if let Some(secs) = env::var("QUILL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
        if let Some(ms) = env::var("QUILL_FRAME_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.frame_interval_ms = ms;
        }
        if let Ok(proxy) = env::var("QUILL_PROXY_URL") {
            self.proxy = Some(proxy);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("base URL is not a valid URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone()),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "base URL must use http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(url.scheme().to_string()),
            ));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "default model must not be empty",
                ErrorContext::new().with_field_path("default_model"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be at least one second",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        Ok(())
    }

    /// Chat completions URL, tolerant of a trailing slash on `base_url`.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
