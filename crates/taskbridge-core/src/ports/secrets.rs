//! Credential provider port (driven/secondary port)
//!
//! Retrieval of the OAuth client credentials and refresh token the remote
//! adapter needs. The engine must not proceed without all three.
//!
//! ## Design Notes
//!
//! Memoization of fetched secrets is deliberately NOT hidden process-wide
//! state: callers hold an explicitly passed [`SecretCache`] that initializes
//! lazily on first use, so tests can inject fresh credentials per case.

use std::sync::Arc;

use tokio::sync::Mutex;

/// The credential triple required to talk to the remote task API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSecrets {
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Port trait for loading remote API credentials
#[async_trait::async_trait]
pub trait ISecretProvider: Send + Sync {
    /// Loads the credential triple
    ///
    /// Fails with an "unavailable" style error when any of the three values
    /// is missing; the caller treats that as fatal to the whole pass.
    async fn load_secrets(&self) -> anyhow::Result<ApiSecrets>;
}

/// Lazily-initialized, explicitly passed cache around a secret provider
///
/// The first call to [`get`](SecretCache::get) loads and memoizes the
/// secrets for the lifetime of this cache instance. A failed load is not
/// cached; the next call retries.
pub struct SecretCache {
    provider: Arc<dyn ISecretProvider>,
    cached: Mutex<Option<ApiSecrets>>,
}

impl SecretCache {
    /// Creates an empty cache over the given provider
    pub fn new(provider: Arc<dyn ISecretProvider>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    /// Returns the secrets, loading them on first use
    pub async fn get(&self) -> anyhow::Result<ApiSecrets> {
        let mut guard = self.cached.lock().await;
        if let Some(secrets) = guard.as_ref() {
            return Ok(secrets.clone());
        }
        let secrets = self.provider.load_secrets().await?;
        *guard = Some(secrets.clone());
        Ok(secrets)
    }

    /// Drops the memoized secrets so the next `get` reloads
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
