use crate::client::core::Generator;
use crate::config::GeneratorConfig;
use crate::credentials::{CredentialSource, KeyringCredentials};
use crate::Result;
use std::sync::Arc;

/// Builder for creating generators with custom configuration.
///
/// Keep this surface area small and predictable (developer-friendly).
pub struct GeneratorBuilder {
    config: Option<GeneratorConfig>,
    credentials: Option<Arc<dyn CredentialSource>>,
    env_overrides: bool,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
    default_model: Option<String>,
    timeout_secs: Option<u64>,
    frame_interval_ms: Option<u64>,
    proxy: Option<String>,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            credentials: None,
            env_overrides: true,
            base_url_override: None,
            default_model: None,
            timeout_secs: None,
            frame_interval_ms: None,
            proxy: None,
        }
    }

    /// Start from an explicit configuration instead of the defaults.
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Credential source. Defaults to the OS keyring with a `QUILL_API_KEY` fallback.
    pub fn credentials(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(source);
        self
    }

    /// Apply `QUILL_*` environment overrides (on by default).
    pub fn env_overrides(mut self, enable: bool) -> Self {
        self.env_overrides = enable;
        self
    }

    /// Override the provider base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn frame_interval_ms(mut self, ms: u64) -> Self {
        self.frame_interval_ms = Some(ms);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the generator. Explicit builder settings win over environment overrides.
    pub fn build(self) -> Result<Generator> {
        let mut config = self.config.unwrap_or_default();
        if self.env_overrides {
            config = config.with_env_overrides()?;
        }
        if let Some(base_url) = self.base_url_override {
            config.base_url = base_url;
        }
        if let Some(model) = self.default_model {
            config.default_model = model;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(ms) = self.frame_interval_ms {
            config.frame_interval_ms = ms;
        }
        if let Some(proxy) = self.proxy {
            config.proxy = Some(proxy);
        }
        config.validate()?;

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(KeyringCredentials::new()));

        Ok(Generator::new(config, credentials))
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
