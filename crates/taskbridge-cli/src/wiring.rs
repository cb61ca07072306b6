//! Shared adapter wiring for CLI commands
//!
//! Every command that touches the engine wires the same adapter stack:
//! config, mapping database, reminder file, keyring credentials, remote
//! client. This module centralizes that so commands stay small.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use taskbridge_core::config::Config;
use taskbridge_core::ports::{
    ILocalItemSource, IMappingStore, IRemoteTaskService, SecretCache,
};
use taskbridge_core::usecases::{
    CompletionSyncUseCase, ItemLocks, PullNewItemsUseCase, PushNewItemsUseCase, SyncPass,
};
use taskbridge_local::JsonLocalItemStore;
use taskbridge_remote::{KeyringSecretProvider, RemoteTaskAdapter, TasksClient, TokenManager};
use taskbridge_store::SqliteMappingStore;

/// The fully wired engine, one instance per command invocation
pub struct Engine {
    pub store: Arc<dyn IMappingStore>,
    pub push: Arc<PushNewItemsUseCase>,
    pub completion: Arc<CompletionSyncUseCase>,
    pub pass: SyncPass,
}

/// Loads the configuration, honoring an explicit `--config` override
pub fn load_config(path_override: Option<&str>) -> Config {
    let path = path_override
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path);
    info!(config_path = %path.display(), "Loaded configuration");
    config
}

/// Opens the mapping database configured in `config`
pub async fn open_store(config: &Config) -> Result<Arc<dyn IMappingStore>> {
    let store = SqliteMappingStore::open(&config.store.database)
        .await
        .context("Failed to open mapping database")?;
    Ok(Arc::new(store))
}

/// Wires the full adapter stack and engine use cases
///
/// Fails when the keyring holds no credential triple; commands surface
/// that with a pointer to `taskbridge auth setup`.
pub async fn build_engine(config: &Config) -> Result<Engine> {
    let store = open_store(config).await?;
    let local: Arc<dyn ILocalItemSource> =
        Arc::new(JsonLocalItemStore::new(&config.local.items_file));

    let provider = Arc::new(KeyringSecretProvider::new(
        config.remote.keyring_service.clone(),
    ));
    let secrets = SecretCache::new(provider)
        .get()
        .await
        .context("No API credentials in keyring; run 'taskbridge auth setup' first")?;

    let tokens = Arc::new(TokenManager::new(&secrets).context("Failed to set up OAuth client")?);
    let client = TasksClient::with_base_url_and_timeout(
        config.remote.base_url.clone(),
        Duration::from_secs(config.remote.timeout),
    )
    .context("Failed to build HTTP client")?;
    let remote: Arc<dyn IRemoteTaskService> = Arc::new(RemoteTaskAdapter::new(client, tokens));

    let locks = Arc::new(ItemLocks::new());
    let push = Arc::new(
        PushNewItemsUseCase::new(remote.clone(), store.clone(), local.clone(), locks.clone())
            .with_default_list(config.sync.default_list.clone()),
    );
    let pull = Arc::new(PullNewItemsUseCase::new(
        remote.clone(),
        store.clone(),
        local.clone(),
    ));
    let completion = Arc::new(CompletionSyncUseCase::new(
        remote,
        store.clone(),
        local.clone(),
        locks,
    ));
    let pass = SyncPass::new(completion.clone(), pull, push.clone());

    Ok(Engine {
        store,
        push,
        completion,
        pass,
    })
}
