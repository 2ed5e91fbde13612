//! Exports command - Manage user study exports
//!
//! Provides the `sitepulse exports` CLI command with subcommands:
//! - `list`: Show all saved exports
//! - `view <id>`: Summarize one export, or print it raw with `--raw`
//! - `delete`: Remove exports from local storage

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use sitepulse_core::config::Config;
use sitepulse_telemetry::{ExportStore, UserStudyExport};

use crate::output::{format_duration_ms, format_size, get_formatter, OutputFormat, OutputFormatter};

/// Export management subcommands
#[derive(Debug, Subcommand)]
pub enum ExportsCommand {
    /// List all saved user study exports
    List,
    /// View a specific export
    View {
        /// Session id or id prefix
        id: String,
        /// Print the export file as stored
        #[arg(long)]
        raw: bool,
    },
    /// Delete exports from local storage
    Delete {
        /// Specific session id to delete
        id: Option<String>,
        /// Delete all exports
        #[arg(long)]
        all: bool,
    },
}

impl ExportsCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let config = Config::load_or_default(config_path);
        let store = ExportStore::new(config.export.dir.clone());
        self.run(&store, format)
    }

    fn run(&self, store: &ExportStore, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        match self {
            ExportsCommand::List => {
                let entries = store.list()?;

                if format.is_json() {
                    let json: Vec<serde_json::Value> = entries
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "id": e.id,
                                "modified": e.modified.to_rfc3339(),
                                "size_bytes": e.size_bytes,
                                "path": e.path.display().to_string(),
                            })
                        })
                        .collect();
                    formatter.print_json(&serde_json::json!(json));
                    return Ok(());
                }

                if entries.is_empty() {
                    formatter.info(&format!(
                        "No exports found in {}",
                        store.exports_dir().display()
                    ));
                    return Ok(());
                }

                println!("{:<38} {:<20} {:>10}", "Session", "Modified", "Size");
                println!("{}", "-".repeat(70));
                for entry in &entries {
                    println!(
                        "{:<38} {:<20} {:>10}",
                        entry.id,
                        entry.modified.format("%Y-%m-%d %H:%M:%S"),
                        format_size(entry.size_bytes),
                    );
                }
                println!();
                println!("Total: {} export(s)", entries.len());
            }

            ExportsCommand::View { id, raw } => match store.read(id)? {
                Some(export) => {
                    if *raw || format.is_json() {
                        println!("{}", export.to_pretty_json()?);
                    } else {
                        print_summary(formatter.as_ref(), &export);
                    }
                }
                None => {
                    formatter.error(&format!("Export '{}' not found", id));
                }
            },

            ExportsCommand::Delete { id, all } => {
                if *all {
                    let count = store.delete_all()?;
                    formatter.success(&format!("Deleted {} export(s)", count));
                } else if let Some(ref export_id) = id {
                    if store.delete(export_id)? {
                        formatter.success(&format!("Deleted export '{}'", export_id));
                    } else {
                        formatter.error(&format!("Export '{}' not found", export_id));
                    }
                } else {
                    formatter.error("Specify a session id or use --all");
                }
            }
        }

        Ok(())
    }
}

fn print_summary(formatter: &dyn OutputFormatter, export: &UserStudyExport) {
    formatter.success(&format!("Session {}", export.session_id));
    formatter.field("Started", &export.start_time.to_rfc3339());
    formatter.field("Ended", &export.end_time.to_rfc3339());
    formatter.field("Duration", &format_duration_ms(export.total_duration));
    formatter.field("User agent", &export.user_agent);
    formatter.field("Screen", &export.screen_resolution);
    formatter.field("Viewport", &export.viewport_size);
    formatter.field("Page views", &export.page_views.len().to_string());
    formatter.field("Interactions", &export.interactions.len().to_string());
    formatter.field("Form submissions", &export.form_submissions.len().to_string());
    formatter.field("Clicks", &export.click_events.len().to_string());

    if export.interactions.is_empty() {
        return;
    }
    formatter.info("");
    formatter.info("Events:");
    for envelope in &export.interactions {
        let offset = (envelope.timestamp() - export.start_time).num_milliseconds();
        formatter.info(&format!(
            "  +{:<10} {}",
            format_duration_ms(offset),
            envelope.event_name()
        ));
    }
}
