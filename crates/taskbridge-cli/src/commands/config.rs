//! Config command - View and validate TaskBridge configuration

use anyhow::{Context, Result};
use clap::Subcommand;

use taskbridge_core::config::Config;

use crate::output::{OutputFormat, Reporter};
use crate::wiring;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Validate the configuration file and report errors
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, config_override: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        match self {
            ConfigCommand::Show => {
                let config = wiring::load_config(config_override);
                if reporter.is_json() {
                    let json = serde_json::to_value(&config)
                        .context("Failed to serialize configuration to JSON")?;
                    reporter.json(&json);
                } else {
                    let yaml = serde_yaml::to_string(&config)
                        .context("Failed to serialize configuration to YAML")?;
                    for line in yaml.lines() {
                        reporter.detail(line);
                    }
                }
            }
            ConfigCommand::Path => {
                let path = config_override
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(Config::default_path);
                if reporter.is_json() {
                    reporter.json(&serde_json::json!({"path": path}));
                } else {
                    println!("{}", path.display());
                }
            }
            ConfigCommand::Validate => {
                let config = wiring::load_config(config_override);
                let errors = config.validate();
                if errors.is_empty() {
                    reporter.success("Configuration is valid");
                } else {
                    for e in &errors {
                        reporter.failure(&e.to_string());
                    }
                    anyhow::bail!("Configuration invalid ({} errors)", errors.len());
                }
            }
        }

        Ok(())
    }
}
