//! Credential-keyed cache of the provider client.
//!
//! The cached [`ProviderClient`] is reused while the credential source keeps returning the same
//! key. Rotating the key (or clearing and re-saving it) swaps in a new client on the next call.

use crate::client::error_classification::classify;
use crate::config::GeneratorConfig;
use crate::credentials::CredentialSource;
use crate::error::ClassifiedError;
use crate::transport::ProviderClient;
use crate::Error;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::info;

pub struct ClientCache {
    source: Arc<dyn CredentialSource>,
    config: GeneratorConfig,
    slot: ArcSwapOption<ProviderClient>,
}

impl ClientCache {
    pub fn new(source: Arc<dyn CredentialSource>, config: GeneratorConfig) -> Self {
        Self {
            source,
            config,
            slot: ArcSwapOption::const_empty(),
        }
    }

    /// Return a client bound to the current credential, building one if needed.
    ///
    /// Fails with a `MissingCredential` classification when no key is configured. Two
    /// concurrent calls with a fresh credential may each build a client; the last store wins
    /// and both handles stay valid for their own requests.
    pub fn get_client(&self) -> Result<Arc<ProviderClient>, ClassifiedError> {
        let credential = match self.source.get() {
            Some(c) => c,
            None => {
                self.slot.store(None);
                return Err(classify(Arc::new(Error::MissingCredential)));
            }
        };

        if let Some(existing) = self.slot.load_full() {
            if existing.is_bound_to(&credential) {
                return Ok(existing);
            }
        }

        let client = Arc::new(
            ProviderClient::new(&self.config, credential).map_err(|e| classify(Arc::new(e)))?,
        );
        info!(endpoint = client.endpoint(), "initialised provider client");
        self.slot.store(Some(client.clone()));
        Ok(client)
    }

    /// Drop the cached client so the next call rebuilds it.
    pub fn invalidate(&self) {
        self.slot.store(None);
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialSource> {
        &self.source
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}
