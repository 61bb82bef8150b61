use crate::client::request::ProviderRequest;
use crate::config::GeneratorConfig;
use crate::error::ErrorContext;
use crate::pipeline::FragmentStream;
use crate::{Error, Result};
use futures::TryStreamExt;
use reqwest::Proxy;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Connection handle to the provider, bound to exactly one credential.
///
/// Never mutated after construction: a credential change produces a new `ProviderClient`
/// (see [`crate::client::ClientCache`]).
pub struct ProviderClient {
    client: reqwest::Client,
    url: String,
    credential: String,
}

// Never prints the credential.
impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    pub fn new(config: &GeneratorConfig, credential: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path("proxy")
                        .with_source("provider_client"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            url: config.chat_completions_url(),
            credential: credential.into(),
        })
    }

    /// Whether this handle was built for `credential`.
    pub fn is_bound_to(&self, credential: &str) -> bool {
        self.credential == credential
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: &ProviderRequest, request_id: &str) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .post(&self.url)
            .bearer_auth(&self.credential)
            .header("x-request-id", request_id)
            .json(request);
        if request.stream {
            req = req.header("accept", "text/event-stream");
        }

        debug!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            stream = request.stream,
            request_id,
            "sending chat completion request"
        );

        let resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        info!(
            http_status = status,
            request_id,
            "provider rejected chat completion request"
        );
        Err(Error::from_provider_body(Some(status), &body))
    }

    /// Issue a non-streaming request and return the first choice's text, or "" if the
    /// provider returned none.
    pub async fn complete(&self, request: &ProviderRequest, request_id: &str) -> Result<String> {
        let resp = self.send(request, request_id).await?;
        let bytes = resp.bytes().await?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)?;
        if let Some(err) = json.get("error") {
            return Err(Error::from_provider_value(None, err));
        }
        let completion: ChatCompletion = serde_json::from_value(json)?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }

    /// Issue a streaming request. Resolves once response headers arrive; the returned
    /// stream yields one fragment per non-empty increment and owns the connection, so
    /// dropping it releases the request.
    pub async fn open_stream(
        &self,
        request: &ProviderRequest,
        request_id: &str,
    ) -> Result<FragmentStream> {
        let resp = self.send(request, request_id).await?;
        let bytes = Box::pin(resp.bytes_stream().map_err(Error::Transport));
        Ok(crate::pipeline::fragment_stream(bytes))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
