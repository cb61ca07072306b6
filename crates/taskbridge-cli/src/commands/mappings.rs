//! Mappings command - List the persisted mapping records

use anyhow::Result;
use clap::Args;

use crate::output::{OutputFormat, Reporter};
use crate::wiring;

/// Mappings command options
#[derive(Debug, Args)]
pub struct MappingsCommand {
    /// Only show mappings recorded as completed
    #[arg(long)]
    pub completed: bool,
}

impl MappingsCommand {
    /// Execute the mappings command
    pub async fn execute(&self, config_override: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        let config = wiring::load_config(config_override);
        let store = wiring::open_store(&config).await?;

        let mut mappings = store.get_all().await?;
        if self.completed {
            mappings.retain(|m| m.completed());
        }

        reporter.mappings(&mappings)
    }
}
