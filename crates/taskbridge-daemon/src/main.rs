//! TaskBridge Daemon - Background reconciliation service
//!
//! This binary runs as a user service and handles:
//! - Periodic reconciliation passes between the local reminder store and
//!   the remote task service
//! - The webhook invocation boundary for external drivers
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon loads configuration, resolves the API credentials from the
//! keyring, wires the adapters into the engine's use cases, optionally
//! starts the webhook server, then enters a main loop that runs one
//! `SyncPass` per tick. The loop is controlled by a `CancellationToken`
//! that is triggered on receipt of SIGTERM or SIGINT.

mod webhook;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taskbridge_core::config::Config;
use taskbridge_core::domain::PushOutcome;
use taskbridge_core::ports::{
    ApiSecrets, ILocalItemSource, IMappingStore, IRemoteTaskService, SecretCache,
};
use taskbridge_core::usecases::{
    CompletionSyncUseCase, ItemLocks, PullNewItemsUseCase, PushNewItemsUseCase, SyncPass,
};
use taskbridge_local::{IdempotencyFile, JsonLocalItemStore};
use taskbridge_remote::{KeyringSecretProvider, RemoteTaskAdapter, TasksClient, TokenManager};
use taskbridge_store::SqliteMappingStore;

use webhook::{WebhookServer, WebhookState};

/// How often to re-check the keyring while credentials are missing
const CREDENTIAL_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Main daemon service that orchestrates reconciliation and the webhook
///
/// Holds the configuration, the two item stores, and a cancellation token
/// for graceful shutdown. The remote adapter and engine are built in
/// [`run`](DaemonService::run) once credentials are available.
struct DaemonService {
    config: Config,
    store: Arc<SqliteMappingStore>,
    local: Arc<JsonLocalItemStore>,
    secrets: SecretCache,
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Creates a new DaemonService
    ///
    /// Loads and validates configuration, opens the mapping database, and
    /// sets up the local reminder store.
    async fn new(shutdown: CancellationToken) -> Result<Self> {
        let config_path = Config::default_path();
        let config = Config::load_or_default(&config_path);
        info!(config_path = %config_path.display(), "Loaded configuration");

        let validation_errors = config.validate();
        if !validation_errors.is_empty() {
            for e in &validation_errors {
                error!(field = %e.field, "Configuration error: {}", e.message);
            }
            anyhow::bail!(
                "Configuration invalid ({} errors); fix {} and restart",
                validation_errors.len(),
                config_path.display()
            );
        }

        let store = Arc::new(
            SqliteMappingStore::open(&config.store.database)
                .await
                .context("Failed to open mapping database")?,
        );

        let local = Arc::new(JsonLocalItemStore::new(&config.local.items_file));

        let provider = Arc::new(KeyringSecretProvider::new(
            config.remote.keyring_service.clone(),
        ));
        let secrets = SecretCache::new(provider);

        Ok(Self {
            config,
            store,
            local,
            secrets,
            shutdown,
        })
    }

    /// Runs the daemon's main loop
    ///
    /// 1. Resolves the API credentials, waiting if they are not provisioned
    /// 2. Builds the remote adapter and the engine use cases
    /// 3. Starts the webhook server when enabled
    /// 4. Enters the reconciliation loop with graceful shutdown support
    async fn run(&self) -> Result<()> {
        let secrets = match self.wait_for_credentials().await? {
            Some(secrets) => secrets,
            None => return Ok(()),
        };

        let tokens = Arc::new(TokenManager::new(&secrets).context("Failed to set up OAuth client")?);
        let client = TasksClient::with_base_url_and_timeout(
            self.config.remote.base_url.clone(),
            Duration::from_secs(self.config.remote.timeout),
        )
        .context("Failed to build HTTP client")?;
        let remote: Arc<dyn IRemoteTaskService> = Arc::new(RemoteTaskAdapter::new(client, tokens));

        let store: Arc<dyn IMappingStore> = self.store.clone();
        let local: Arc<dyn ILocalItemSource> = self.local.clone();
        let locks = Arc::new(ItemLocks::new());

        let push = Arc::new(
            PushNewItemsUseCase::new(remote.clone(), store.clone(), local.clone(), locks.clone())
                .with_default_list(self.config.sync.default_list.clone()),
        );
        let pull = Arc::new(PullNewItemsUseCase::new(
            remote.clone(),
            store.clone(),
            local.clone(),
        ));
        let completion = Arc::new(CompletionSyncUseCase::new(
            remote.clone(),
            store.clone(),
            local.clone(),
            locks,
        ));
        let pass = SyncPass::new(completion.clone(), pull.clone(), push.clone());

        if self.config.webhook.enabled {
            let state = Arc::new(WebhookState {
                auth_token: self.config.webhook.auth_token.clone(),
                push,
                completion,
                pull,
                store: store.clone(),
                remote,
            });
            let server = WebhookServer::new(state, &self.config.webhook.bind)
                .context("Failed to set up webhook server")?;
            let token = self.shutdown.child_token();
            tokio::spawn(async move {
                if let Err(e) = server.run(token).await {
                    error!(error = %format!("{e:#}"), "Webhook server failed");
                }
            });
        }

        self.sync_loop(&pass).await
    }

    /// Main reconciliation loop with periodic passes
    ///
    /// Uses `tokio::time::interval` based on `config.sync.interval`. Each
    /// tick runs one full pass, feeding the idempotency cache into the push
    /// phase and recording its outcomes afterwards.
    async fn sync_loop(&self, pass: &SyncPass) -> Result<()> {
        let interval_secs = self.config.sync.interval;
        info!(interval_secs, "Starting reconciliation loop");

        let mut cache = IdempotencyFile::load(&self.config.local.idempotency_file)
            .await
            .context("Failed to load idempotency cache")?;

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; we want to reconcile right away
        interval.tick().await;

        loop {
            info!("Starting reconciliation pass");

            match pass.run(&cache.pushed_ids()).await {
                Ok(summary) => {
                    self.record_outcomes(&mut cache, &summary.push_outcomes)
                        .await;
                    if !summary.is_clean() {
                        for e in &summary.errors {
                            warn!("Pass item error: {e}");
                        }
                    }
                }
                Err(e) => {
                    error!(error = %format!("{e:#}"), "Reconciliation pass failed");
                }
            }

            // Wait for the next interval or shutdown
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Reconciliation loop terminated");
        Ok(())
    }

    /// Records push outcomes into the idempotency cache and persists it
    ///
    /// Every outcome means the item is mapped now, so all of them are
    /// cached. A failed save only costs redundant lookups next pass.
    async fn record_outcomes(
        &self,
        cache: &mut IdempotencyFile,
        outcomes: &[(taskbridge_core::domain::LocalId, PushOutcome)],
    ) {
        if outcomes.is_empty() {
            return;
        }

        for (local_id, outcome) in outcomes {
            let title = match self.store.get(local_id).await {
                Ok(Some(mapping)) => mapping.title().to_string(),
                Ok(None) => String::new(),
                Err(e) => {
                    warn!(local_id = %local_id, error = %e, "Mapping lookup for cache failed");
                    String::new()
                }
            };
            cache.record(local_id.clone(), outcome.remote_item_id().clone(), &title);
        }

        if let Err(e) = cache.save().await {
            warn!(error = %format!("{e:#}"), "Failed to save idempotency cache");
        }
    }

    /// Waits for API credentials in a loop, checking periodically
    ///
    /// When the keyring holds no credential triple, the daemon enters this
    /// wait loop and re-checks every 30 seconds. Returns `None` when
    /// shutdown is requested while waiting.
    async fn wait_for_credentials(&self) -> Result<Option<ApiSecrets>> {
        match self.secrets.get().await {
            Ok(secrets) => return Ok(Some(secrets)),
            Err(e) => {
                warn!(
                    error = %format!("{e:#}"),
                    "API credentials not available. Run 'taskbridge auth setup' to provision them."
                );
            }
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(CREDENTIAL_CHECK_INTERVAL) => {
                    match self.secrets.get().await {
                        Ok(secrets) => {
                            info!("API credentials found, starting engine");
                            return Ok(Some(secrets));
                        }
                        Err(_) => {
                            // Still not provisioned, keep waiting
                        }
                    }
                }
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received while waiting for credentials");
                    return Ok(None);
                }
            }
        }
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(&Config::default_path());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("TaskBridge daemon starting (taskbridged)");

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(shutdown_token.clone()).await?;

    let result = service.run().await;

    match &result {
        Ok(()) => info!("TaskBridge daemon shut down gracefully"),
        Err(e) => error!(error = %e, "TaskBridge daemon exiting with error"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_cancel() {
        let token = CancellationToken::new();
        let child = token.child_token();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_config_default_interval() {
        let config = Config::default();
        assert!(config.sync.interval > 0);
    }

    #[test]
    fn test_config_default_path_is_non_empty() {
        let path = Config::default_path();
        assert!(!path.as_os_str().is_empty());
    }
}
