//! Auth command - Provision and inspect API credentials
//!
//! The daemon never runs an interactive OAuth flow; the credential triple
//! (client id, client secret, refresh token) is provisioned once via this
//! command and stored in the system keyring.

use anyhow::Result;
use clap::{Args, Subcommand};

use taskbridge_core::ports::{ApiSecrets, ISecretProvider};
use taskbridge_remote::KeyringSecretProvider;

use crate::output::{OutputFormat, Reporter};

/// Auth subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store the OAuth credential triple in the system keyring
    Setup(SetupArgs),
    /// Show whether credentials are provisioned
    Status,
    /// Remove stored credentials from the keyring
    Clear,
}

/// Arguments for `auth setup`
#[derive(Debug, Args)]
pub struct SetupArgs {
    /// OAuth2 client id
    #[arg(long)]
    pub client_id: String,

    /// OAuth2 client secret
    #[arg(long)]
    pub client_secret: String,

    /// Long-lived refresh token
    #[arg(long)]
    pub refresh_token: String,
}

impl AuthCommand {
    /// Execute the auth command
    pub async fn execute(&self, config_override: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);
        let config = crate::wiring::load_config(config_override);
        let provider = KeyringSecretProvider::new(config.remote.keyring_service.clone());

        match self {
            AuthCommand::Setup(args) => {
                provider.store_secrets(&ApiSecrets {
                    client_id: args.client_id.clone(),
                    client_secret: args.client_secret.clone(),
                    refresh_token: args.refresh_token.clone(),
                })?;
                reporter.success(&format!(
                    "Credentials stored under keyring service '{}'",
                    config.remote.keyring_service
                ));
            }
            AuthCommand::Status => match provider.load_secrets().await {
                Ok(secrets) => {
                    if reporter.is_json() {
                        reporter.json(&serde_json::json!({
                            "provisioned": true,
                            "client_id": secrets.client_id,
                        }));
                    } else {
                        reporter.success("Credentials are provisioned");
                        reporter.detail(&format!("client_id: {}", secrets.client_id));
                    }
                }
                Err(e) => {
                    if reporter.is_json() {
                        reporter.json(&serde_json::json!({"provisioned": false}));
                    } else {
                        reporter.failure(&format!("{e:#}"));
                    }
                }
            },
            AuthCommand::Clear => {
                provider.clear()?;
                reporter.success("Credentials removed from keyring");
            }
        }

        Ok(())
    }
}
