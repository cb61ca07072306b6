//! Sync command - Run one reconciliation pass
//!
//! Provides the `taskbridge sync` CLI command which:
//! 1. Loads configuration and wires the adapter stack
//! 2. Loads the push idempotency cache
//! 3. Runs one full `SyncPass` and records its outcomes
//! 4. Displays the pass summary

use anyhow::{Context, Result};
use clap::Args;

use taskbridge_local::IdempotencyFile;

use crate::output::{OutputFormat, Reporter};
use crate::wiring;

/// Sync command options
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Skip the push idempotency cache and let the mapping store decide
    #[arg(long)]
    pub no_cache: bool,
}

impl SyncCommand {
    /// Execute the sync command
    pub async fn execute(&self, config_override: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        let config = wiring::load_config(config_override);
        let engine = match wiring::build_engine(&config).await {
            Ok(engine) => engine,
            Err(e) => {
                reporter.failure(&format!("{e:#}"));
                return Ok(());
            }
        };

        let mut cache = IdempotencyFile::load(&config.local.idempotency_file)
            .await
            .context("Failed to load idempotency cache")?;
        let exclude = if self.no_cache {
            Default::default()
        } else {
            cache.pushed_ids()
        };

        let summary = engine.pass.run(&exclude).await?;

        for (local_id, outcome) in &summary.push_outcomes {
            let title = match engine.store.get(local_id).await {
                Ok(Some(mapping)) => mapping.title().to_string(),
                _ => String::new(),
            };
            cache.record(local_id.clone(), outcome.remote_item_id().clone(), &title);
        }
        cache.save().await.context("Failed to save idempotency cache")?;

        reporter.pass_summary(&summary);

        Ok(())
    }
}
