//! Divergences command - Show pending completion divergences
//!
//! Enumerates mappings whose remote completion state disagrees with the
//! stored belief, without applying anything. The next pass (or the webhook
//! `complete` action) resolves them.

use anyhow::Result;
use clap::Args;

use crate::output::{OutputFormat, Reporter};
use crate::wiring;

/// Divergences command options
#[derive(Debug, Args)]
pub struct DivergencesCommand {}

impl DivergencesCommand {
    /// Execute the divergences command
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

        let divergences = engine.completion.pending_divergences().await?;
        reporter.divergences(&divergences)
    }
}
