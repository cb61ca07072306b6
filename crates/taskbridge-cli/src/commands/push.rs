//! Push command - Push a single item through the engine
//!
//! The CLI counterpart of the webhook's default action. Useful for manual
//! testing and for scripting drivers that do not speak HTTP.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use taskbridge_core::domain::{IncomingTask, LocalId};

use crate::output::{OutputFormat, Reporter};
use crate::wiring;

/// Push command options
#[derive(Debug, Args)]
pub struct PushCommand {
    /// Title of the item
    pub title: String,

    /// Caller-supplied local identity; synthesized when absent
    #[arg(long)]
    pub local_id: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Due timestamp (RFC 3339)
    #[arg(long)]
    pub due: Option<String>,

    /// Name of the remote list to file the item under
    #[arg(long)]
    pub list: Option<String>,

    /// Re-push even when a mapping already exists
    #[arg(long)]
    pub force: bool,
}

impl PushCommand {
    /// Execute the push command
    pub async fn execute(&self, config_override: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        let local_id = self
            .local_id
            .as_ref()
            .map(|id| LocalId::new(id.clone()))
            .transpose()?;
        let due: Option<DateTime<Utc>> = self
            .due
            .as_deref()
            .map(|d| {
                DateTime::parse_from_rfc3339(d)
                    .map(|dt| dt.with_timezone(&Utc))
                    .with_context(|| format!("Invalid due timestamp '{d}'"))
            })
            .transpose()?;

        let config = wiring::load_config(config_override);
        let engine = match wiring::build_engine(&config).await {
            Ok(engine) => engine,
            Err(e) => {
                reporter.failure(&format!("{e:#}"));
                return Ok(());
            }
        };

        let item = IncomingTask {
            local_id,
            title: self.title.clone(),
            notes: self.notes.clone(),
            due,
            list_name: self.list.clone(),
        };

        let (local_id, outcome) = engine.push.push_one(&item, self.force).await?;
        reporter.push_outcome(&self.title, local_id.as_str(), &outcome);

        Ok(())
    }
}
