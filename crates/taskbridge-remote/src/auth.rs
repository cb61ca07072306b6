//! OAuth2 refresh-token authentication for the task API
//!
//! The daemon never runs an interactive browser flow; it is provisioned with
//! a long-lived refresh token and exchanges it for short-lived access tokens
//! as needed.
//!
//! ## Components
//!
//! - [`KeyringSecretProvider`] - Loads the credential triple from the system
//!   keyring
//! - [`TokenManager`] - Caches the current access token and refreshes it
//!   shortly before expiry

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken,
    TokenResponse, TokenUrl,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use taskbridge_core::ports::{ApiSecrets, ISecretProvider};

/// Default OAuth2 token endpoint
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Keyring usernames for the three credential values
const KEY_CLIENT_ID: &str = "client_id";
const KEY_CLIENT_SECRET: &str = "client_secret";
const KEY_REFRESH_TOKEN: &str = "refresh_token";

/// Refresh this long before the access token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// KeyringSecretProvider
// ============================================================================

/// Loads the OAuth credential triple from the system keyring
///
/// Uses the `keyring` crate to read from the OS credential store (e.g.,
/// GNOME Keyring, KDE Wallet). The three values live under one configurable
/// service name with fixed usernames.
pub struct KeyringSecretProvider {
    service: String,
}

impl KeyringSecretProvider {
    /// Creates a provider reading from the given keyring service name
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn read(&self, key: &str) -> Result<String> {
        let entry = keyring::Entry::new(&self.service, key)
            .context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(anyhow::anyhow!(
                "Credential '{key}' not found in keyring service '{}'",
                self.service
            )),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, key)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store credential in keyring")?;
        debug!(key, "Stored credential in keyring");
        Ok(())
    }

    /// Stores the full credential triple, overwriting any previous values
    ///
    /// Used by the CLI provisioning command.
    pub fn store_secrets(&self, secrets: &ApiSecrets) -> Result<()> {
        self.store(KEY_CLIENT_ID, &secrets.client_id)?;
        self.store(KEY_CLIENT_SECRET, &secrets.client_secret)?;
        self.store(KEY_REFRESH_TOKEN, &secrets.refresh_token)?;
        info!(service = %self.service, "Stored credentials in keyring");
        Ok(())
    }

    /// Removes all three credential values
    pub fn clear(&self) -> Result<()> {
        for key in [KEY_CLIENT_ID, KEY_CLIENT_SECRET, KEY_REFRESH_TOKEN] {
            let entry = keyring::Entry::new(&self.service, key)
                .context("Failed to create keyring entry")?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("Failed to delete from keyring"))
                }
            }
        }
        info!(service = %self.service, "Cleared credentials from keyring");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ISecretProvider for KeyringSecretProvider {
    async fn load_secrets(&self) -> Result<ApiSecrets> {
        Ok(ApiSecrets {
            client_id: self.read(KEY_CLIENT_ID)?,
            client_secret: self.read(KEY_CLIENT_SECRET)?,
            refresh_token: self.read(KEY_REFRESH_TOKEN)?,
        })
    }
}

// ============================================================================
// TokenManager
// ============================================================================

type RefreshOnlyClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Exchanges the refresh token for access tokens and caches the result
///
/// The cached token is reused until shortly before its expiry; concurrent
/// callers share one refresh through the internal mutex.
pub struct TokenManager {
    client: RefreshOnlyClient,
    refresh_token: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenManager {
    /// Creates a token manager with the default token endpoint
    pub fn new(secrets: &ApiSecrets) -> Result<Self> {
        Self::with_token_url(secrets, TOKEN_URL)
    }

    /// Creates a token manager with a custom token endpoint (for tests)
    pub fn with_token_url(secrets: &ApiSecrets, token_url: impl Into<String>) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
            .set_token_uri(TokenUrl::new(token_url.into()).context("Invalid token URL")?);

        Ok(Self {
            client,
            refresh_token: secrets.refresh_token.clone(),
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, refreshing if needed
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.cached.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
                return Ok(cached.access_token.clone());
            }
            debug!("Cached access token near expiry, refreshing");
        }

        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(self.refresh_token.clone()))
            .request_async(&self.http)
            .await
            .context("Failed to refresh access token")?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let access_token = token_result.access_token().secret().to_string();
        *guard = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        info!("Refreshed access token");
        Ok(access_token)
    }

    /// Drops the cached access token so the next call refreshes
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
