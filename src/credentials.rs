//! Credential sources.
//!
//! The generator never stores an API key itself; it asks a [`CredentialSource`] on every call
//! so that a key saved or cleared in settings takes effect on the very next request.

use crate::{Error, Result};
use keyring::Entry;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Persists and returns the current API credential.
pub trait CredentialSource: Send + Sync {
    /// Current credential, or `None` when none is configured.
    fn get(&self) -> Option<String>;

    /// Store a new credential. Saving an empty string clears it.
    fn set(&self, credential: &str) -> Result<()>;

    /// Remove the stored credential.
    fn clear(&self) -> Result<()>;
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    value: RwLock<Option<String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(credential.into())),
        }
    }
}

impl CredentialSource for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.value
            .read()
            .ok()
            .and_then(|v| v.clone())
            .filter(|v| !v.is_empty())
    }

    fn set(&self, credential: &str) -> Result<()> {
        let mut slot = self
            .value
            .write()
            .map_err(|_| Error::Credential("credential lock poisoned".into()))?;
        *slot = (!credential.is_empty()).then(|| credential.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.set("")
    }
}

/// OS keyring backed store, falling back to an environment variable on read.
///
/// After [`clear`](CredentialSource::clear) the environment variable is ignored until a new key
/// is saved, so a cleared key reads back as `None`.
pub struct KeyringCredentials {
    service: String,
    account: String,
    env_var: String,
    env_fallback: AtomicBool,
}

impl KeyringCredentials {
    pub const DEFAULT_SERVICE: &'static str = "quillstream";
    pub const DEFAULT_ACCOUNT: &'static str = "api-key";
    pub const DEFAULT_ENV_VAR: &'static str = "QUILL_API_KEY";

    pub fn new() -> Self {
        Self {
            service: Self::DEFAULT_SERVICE.to_string(),
            account: Self::DEFAULT_ACCOUNT.to_string(),
            env_var: Self::DEFAULT_ENV_VAR.to_string(),
            env_fallback: AtomicBool::new(true),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = env_var.into();
        self
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.account).map_err(|e| Error::Credential(e.to_string()))
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for KeyringCredentials {
    fn get(&self) -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = self.entry() {
            if let Ok(key) = entry.get_password() {
                if !key.is_empty() {
                    return Some(key);
                }
            }
        }

        // 2. Try Environment Variable
        if !self.env_fallback.load(Ordering::Acquire) {
            return None;
        }
        env::var(&self.env_var).ok().filter(|k| !k.is_empty())
    }

    fn set(&self, credential: &str) -> Result<()> {
        if credential.is_empty() {
            return self.clear();
        }
        self.entry()?
            .set_password(credential)
            .map_err(|e| Error::Credential(e.to_string()))?;
        self.env_fallback.store(true, Ordering::Release);
        tracing::info!(service = self.service.as_str(), "saved API key to keyring");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.env_fallback.store(false, Ordering::Release);
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Credential(e.to_string())),
        }
    }
}
