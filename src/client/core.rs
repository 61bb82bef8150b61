use crate::client::builder::GeneratorBuilder;
use crate::client::cache::ClientCache;
use crate::client::error_classification::classify;
use crate::client::lifecycle::{StreamLifecycle, StreamState};
use crate::client::request::{self, GenerationOptions};
use crate::config::GeneratorConfig;
use crate::credentials::CredentialSource;
use crate::error::ClassifiedError;
use crate::pipeline::FragmentStream;
use crate::types::Message;
use crate::Error;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Text generator over an OpenAI-compatible chat completions endpoint.
///
/// Cheap to share behind an `Arc`; every call looks up the current credential, so a key saved
/// in settings takes effect on the next call without rebuilding the generator.
pub struct Generator {
    pub(crate) cache: ClientCache,
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    pub fn new(config: GeneratorConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            cache: ClientCache::new(credentials, config),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.cache.config()
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// Save a new API key. An empty key clears the stored one and drops the cached client.
    pub fn update_credential(&self, credential: &str) -> crate::Result<()> {
        self.cache.credentials().set(credential)?;
        if credential.is_empty() {
            self.cache.invalidate();
        }
        Ok(())
    }

    /// Generate a complete response in one round trip.
    ///
    /// Empty input resolves to `""` without touching the credential store or the network.
    pub async fn generate(
        &self,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, ClassifiedError> {
        if messages.is_empty() {
            return Ok(String::new());
        }
        let client = self.cache.get_client()?;
        let request = request::build(messages, &options, &self.config().default_model);
        let request_id = Uuid::new_v4().to_string();

        let cancel = options.cancellation.clone().unwrap_or_default();
        let outcome = until_cancelled(&cancel, client.complete(&request, &request_id)).await;
        outcome.map_err(|e| {
            let classified = classify(Arc::new(e));
            log_outcome(&request_id, &classified);
            classified
        })
    }

    /// Stream a response, calling `on_fragment` once per non-empty increment, in order.
    ///
    /// Cancelling `options.cancellation` stops delivery before the next increment, releases the
    /// connection, and resolves to an `Aborted` error.
    pub async fn generate_stream<F>(
        &self,
        messages: &[Message],
        options: GenerationOptions,
        mut on_fragment: F,
    ) -> Result<(), ClassifiedError>
    where
        F: FnMut(&str),
    {
        if messages.is_empty() {
            return Ok(());
        }
        let request_id = Uuid::new_v4().to_string();
        let mut lifecycle = StreamLifecycle::new(request_id.clone());
        let cancel = options.cancellation.clone().unwrap_or_default();

        if options.is_cancelled() {
            return Err(conclude(&mut lifecycle, Error::Cancelled));
        }

        lifecycle.advance(StreamState::Connecting);
        let client = match self.cache.get_client() {
            Ok(client) => client,
            Err(e) => {
                lifecycle.advance(StreamState::Failed);
                log_outcome(&request_id, &e);
                return Err(e);
            }
        };

        let request =
            request::build(messages, &options, &self.config().default_model).streaming(true);
        info!(
            request_id = request_id.as_str(),
            model = request.model.as_str(),
            "starting generation stream"
        );

        let stream = match until_cancelled(&cancel, client.open_stream(&request, &request_id)).await
        {
            Ok(stream) => stream,
            Err(e) => return Err(conclude(&mut lifecycle, e)),
        };
        lifecycle.advance(StreamState::Streaming);

        drive_stream(stream, &cancel, &mut lifecycle, &mut on_fragment).await
    }
}

/// Pump `stream` into `on_fragment` until it ends, fails, or `cancel` fires.
///
/// Cancellation is checked before every increment, so no callback runs once the token is
/// cancelled. The stream is dropped on every exit path.
pub(crate) async fn drive_stream<F>(
    mut stream: FragmentStream,
    cancel: &CancellationToken,
    lifecycle: &mut StreamLifecycle,
    on_fragment: &mut F,
) -> Result<(), ClassifiedError>
where
    F: FnMut(&str),
{
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => Some(Err(Error::Cancelled)),
            item = stream.next() => item,
        };
        match next {
            Some(Ok(fragment)) => {
                lifecycle.record_fragment();
                on_fragment(fragment.as_str());
            }
            Some(Err(e)) => {
                drop(stream);
                return Err(conclude(lifecycle, e));
            }
            None => {
                lifecycle.advance(StreamState::Completed);
                info!(
                    request_id = lifecycle.request_id(),
                    fragments = lifecycle.fragments(),
                    "generation stream completed"
                );
                return Ok(());
            }
        }
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = crate::Result<T>>,
) -> crate::Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        r = fut => r,
    }
}

/// Classify `raw` and move the lifecycle to the matching terminal state.
fn conclude(lifecycle: &mut StreamLifecycle, raw: Error) -> ClassifiedError {
    let classified = classify(Arc::new(raw));
    let terminal = if classified.is_aborted() {
        StreamState::Aborted
    } else {
        StreamState::Failed
    };
    lifecycle.advance(terminal);
    log_outcome(lifecycle.request_id(), &classified);
    classified
}

fn log_outcome(request_id: &str, err: &ClassifiedError) {
    if err.category.is_silent() {
        info!(request_id, "generation aborted by caller");
    } else {
        warn!(
            request_id,
            error_code = err.category.code(),
            error = %err.original,
            "generation failed"
        );
    }
}
