//! Configuration module for TaskBridge.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for TaskBridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub sync: SyncConfig,
    pub store: StoreConfig,
    pub local: LocalConfig,
    pub remote: RemoteConfig,
    pub webhook: WebhookConfig,
    pub logging: LoggingConfig,
}

/// Reconciliation pass settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between reconciliation passes.
    pub interval: u64,
    /// Remote list used when an item names no container.
    pub default_list: String,
}

/// Mapping database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite mapping database.
    pub database: PathBuf,
}

/// Local reminder store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Path to the JSON reminder file.
    pub items_file: PathBuf,
    /// Path to the push idempotency cache file.
    pub idempotency_file: PathBuf,
}

/// Remote task API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the task API. Overridable for tests.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Keyring service name holding the OAuth credentials.
    pub keyring_service: String,
}

/// Webhook server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Whether to start the webhook server.
    pub enabled: bool,
    /// Bind address, e.g. `127.0.0.1:7878`.
    pub bind: String,
    /// Shared secret; requests without it are rejected.
    pub auth_token: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/taskbridge/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("taskbridge")
            .join("config.yaml")
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: 300,
            default_list: crate::domain::DEFAULT_LIST_NAME.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: data_dir().join("mappings.db"),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            items_file: data_dir().join("reminders.json"),
            idempotency_file: data_dir().join("synced_reminders.json"),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tasks.googleapis.com/tasks/v1".to_string(),
            timeout: 30,
            keyring_service: "taskbridge".to_string(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1:7878".to_string(),
            auth_token: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("taskbridge")
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.sync.interval == 0 {
            errors.push(ValidationError {
                field: "sync.interval".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.default_list.trim().is_empty() {
            errors.push(ValidationError {
                field: "sync.default_list".into(),
                message: "must not be empty".into(),
            });
        }

        if self.remote.timeout == 0 {
            errors.push(ValidationError {
                field: "remote.timeout".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.remote.base_url.trim().is_empty() {
            errors.push(ValidationError {
                field: "remote.base_url".into(),
                message: "must not be empty".into(),
            });
        }
        if self.remote.keyring_service.trim().is_empty() {
            errors.push(ValidationError {
                field: "remote.keyring_service".into(),
                message: "must not be empty".into(),
            });
        }

        if self.webhook.enabled {
            if self.webhook.bind.parse::<std::net::SocketAddr>().is_err() {
                errors.push(ValidationError {
                    field: "webhook.bind".into(),
                    message: format!("not a valid socket address: {}", self.webhook.bind),
                });
            }
            if self.webhook.auth_token.is_empty() {
                errors.push(ValidationError {
                    field: "webhook.auth_token".into(),
                    message: "must be set when the webhook is enabled".into(),
                });
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_interval(mut self, seconds: u64) -> Self {
        self.config.sync.interval = seconds;
        self
    }

    pub fn sync_default_list(mut self, name: impl Into<String>) -> Self {
        self.config.sync.default_list = name.into();
        self
    }

    pub fn store_database(mut self, path: PathBuf) -> Self {
        self.config.store.database = path;
        self
    }

    pub fn local_items_file(mut self, path: PathBuf) -> Self {
        self.config.local.items_file = path;
        self
    }

    pub fn local_idempotency_file(mut self, path: PathBuf) -> Self {
        self.config.local.idempotency_file = path;
        self
    }

    pub fn remote_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.base_url = url.into();
        self
    }

    pub fn remote_timeout(mut self, seconds: u64) -> Self {
        self.config.remote.timeout = seconds;
        self
    }

    pub fn webhook_enabled(mut self, enabled: bool) -> Self {
        self.config.webhook.enabled = enabled;
        self
    }

    pub fn webhook_bind(mut self, bind: impl Into<String>) -> Self {
        self.config.webhook.bind = bind.into();
        self
    }

    pub fn webhook_auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.webhook.auth_token = token.into();
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}
