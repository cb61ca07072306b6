//! Command output rendering
//!
//! Commands render through a [`Reporter`] bound to the selected output
//! format. Human mode prints prefixed lines; JSON mode prints one pretty
//! document per command and suppresses the human detail lines. The
//! engine-specific views (pass summaries, mapping records, divergences)
//! are rendered here so the commands only decide what to show.

use taskbridge_core::domain::{PushOutcome, SyncedItem};
use taskbridge_core::usecases::{CompletionDivergence, PassSummary};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Renders command results in the selected format
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a headline result
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("\u{2713} {}", message),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({"success": true, "message": message})
            ),
        }
    }

    /// Prints a failure to stderr
    pub fn failure(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{2717} Error: {}", message),
            OutputFormat::Json => eprintln!(
                "{}",
                serde_json::json!({"success": false, "error": message})
            ),
        }
    }

    /// Prints a warning to stderr
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{26a0} Warning: {}", message),
            OutputFormat::Json => eprintln!(
                "{}",
                serde_json::json!({"level": "warning", "message": message})
            ),
        }
    }

    /// Prints an indented detail line; suppressed in JSON mode
    pub fn detail(&self, message: &str) {
        if self.format == OutputFormat::Human {
            println!("  {}", message);
        }
    }

    /// Prints a JSON document; no-op in human mode
    pub fn json(&self, value: &serde_json::Value) {
        if self.format == OutputFormat::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }

    /// Renders the result of one reconciliation pass
    pub fn pass_summary(&self, summary: &PassSummary) {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "completions_pulled": summary.completions_pulled,
                "completions_pushed": summary.completions_pushed,
                "items_pulled": summary.items_pulled,
                "items_pushed": summary.items_pushed(),
                "errors": summary.errors,
                "duration_ms": summary.duration_ms,
            })),
            OutputFormat::Human => {
                self.success(&format!("Pass completed in {} ms", summary.duration_ms));
                for line in pass_summary_lines(summary) {
                    self.detail(&line);
                }
                for e in &summary.errors {
                    self.warn(e);
                }
            }
        }
    }

    /// Renders the persisted mapping records
    pub fn mappings(&self, mappings: &[SyncedItem]) -> anyhow::Result<()> {
        if self.is_json() {
            self.json(&serde_json::to_value(mappings)?);
            return Ok(());
        }
        if mappings.is_empty() {
            self.success("No mapping records");
            return Ok(());
        }
        self.success(&format!("{} mapping records", mappings.len()));
        for m in mappings {
            self.detail(&mapping_line(m));
        }
        Ok(())
    }

    /// Renders pending completion divergences
    pub fn divergences(&self, divergences: &[CompletionDivergence]) -> anyhow::Result<()> {
        if self.is_json() {
            self.json(&serde_json::to_value(divergences)?);
            return Ok(());
        }
        if divergences.is_empty() {
            self.success("No pending divergences");
            return Ok(());
        }
        self.success(&format!("{} pending divergences", divergences.len()));
        for d in divergences {
            self.detail(&divergence_line(d));
        }
        Ok(())
    }

    /// Renders the outcome of a single push
    pub fn push_outcome(&self, title: &str, local_id: &str, outcome: &PushOutcome) {
        if self.is_json() {
            self.json(&serde_json::json!({
                "local_id": local_id,
                "result": outcome,
            }));
        } else {
            self.success(&push_outcome_line(title, outcome));
        }
    }
}

fn pass_summary_lines(summary: &PassSummary) -> Vec<String> {
    vec![
        format!("completions pulled: {}", summary.completions_pulled),
        format!("completions pushed: {}", summary.completions_pushed),
        format!("items pulled:       {}", summary.items_pulled),
        format!("items pushed:       {}", summary.items_pushed()),
    ]
}

fn mapping_line(m: &SyncedItem) -> String {
    let mark = if m.completed() { "x" } else { " " };
    format!(
        "[{}] {} <-> {}  {}",
        mark,
        m.local_id(),
        m.remote_item_id(),
        m.title()
    )
}

fn divergence_line(d: &CompletionDivergence) -> String {
    let state = |completed: bool| if completed { "completed" } else { "open" };
    format!(
        "{} '{}': recorded {} but remote says {}",
        d.local_id,
        d.title,
        state(d.recorded_completed),
        state(d.remote_completed),
    )
}

fn push_outcome_line(title: &str, outcome: &PushOutcome) -> String {
    if outcome.is_created() {
        format!(
            "Created remote item {} for '{}'",
            outcome.remote_item_id(),
            title
        )
    } else if outcome.is_already_synced() {
        format!("'{}' already synced as {}", title, outcome.remote_item_id())
    } else {
        format!(
            "Updated remote item {} for '{}'",
            outcome.remote_item_id(),
            title
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskbridge_core::domain::{LocalId, RemoteItemId, RemoteListId};

    fn mapping(completed: bool) -> SyncedItem {
        SyncedItem::new(
            LocalId::new("a1".to_string()).unwrap(),
            RemoteItemId::new("r1".to_string()).unwrap(),
            RemoteListId::new("l1".to_string()).unwrap(),
            "Buy milk",
            completed,
        )
    }

    #[test]
    fn test_mapping_line_marks_completion() {
        assert_eq!(mapping_line(&mapping(false)), "[ ] a1 <-> r1  Buy milk");
        assert_eq!(mapping_line(&mapping(true)), "[x] a1 <-> r1  Buy milk");
    }

    #[test]
    fn test_push_outcome_lines() {
        let id = RemoteItemId::new("r1".to_string()).unwrap();
        let list = RemoteListId::new("l1".to_string()).unwrap();

        let created = PushOutcome::Created {
            remote_item_id: id.clone(),
            remote_list_id: list.clone(),
        };
        assert_eq!(
            push_outcome_line("Buy milk", &created),
            "Created remote item r1 for 'Buy milk'"
        );

        let skipped = PushOutcome::AlreadySynced {
            remote_item_id: id.clone(),
        };
        assert_eq!(
            push_outcome_line("Buy milk", &skipped),
            "'Buy milk' already synced as r1"
        );

        let updated = PushOutcome::Updated {
            remote_item_id: id,
            remote_list_id: list,
        };
        assert_eq!(
            push_outcome_line("Buy milk", &updated),
            "Updated remote item r1 for 'Buy milk'"
        );
    }

    #[test]
    fn test_pass_summary_lines_cover_all_counters() {
        let summary = PassSummary {
            completions_pulled: 1,
            completions_pushed: 2,
            items_pulled: 3,
            ..Default::default()
        };

        let lines = pass_summary_lines(&summary);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "completions pulled: 1");
        assert_eq!(lines[3], "items pushed:       0");
    }
}
