//! Replay command - Drive a page session from a recorded event stream
//!
//! Reads JSON lines of the form `{"at_ms": <offset>, "event": <HostEvent>}`
//! where `at_ms` is the offset from session start. The session clock is
//! moved to each offset before the event is dispatched, so durations in
//! the resulting export match the recording.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitepulse_core::config::Config;
use sitepulse_core::domain::{Dimensions, PageContext};
use sitepulse_core::ports::{IAnalyticsSink, IArtifactTarget, ManualClock};
use sitepulse_telemetry::{
    build_sink, ExportStore, HostCapabilities, HostEvent, HttpCollectorSink, MetricsRegistry,
    PageSession, UserStudyExport,
};
use tracing::{info, warn};

use crate::output::{format_duration_ms, get_formatter, OutputFormat};

/// One line of a replay stream
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    /// Milliseconds since session start
    #[serde(default)]
    pub at_ms: i64,
    pub event: HostEvent,
}

/// Arguments for the replay subcommand
#[derive(Debug, clap::Args)]
pub struct ReplayCommand {
    /// JSON-lines event stream ("-" reads stdin)
    pub input: PathBuf,

    /// URL of the replayed page
    #[arg(long, default_value = "about:blank")]
    pub url: String,

    /// Title of the replayed page
    #[arg(long, default_value = "")]
    pub title: String,

    /// Referrer of the replayed page
    #[arg(long)]
    pub referrer: Option<String>,

    /// User agent reported in envelopes
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Screen size as WIDTHxHEIGHT
    #[arg(long)]
    pub screen: Option<Dimensions>,

    /// Initial viewport size as WIDTHxHEIGHT
    #[arg(long)]
    pub viewport: Option<Dimensions>,

    /// Treat the host as lacking a performance observer
    #[arg(long)]
    pub no_performance_observer: bool,

    /// Override the configured sink kind (log, http, none)
    #[arg(long)]
    pub sink: Option<String>,

    /// Save the user study export to the export directory
    #[arg(long)]
    pub export: bool,

    /// Print Prometheus metrics collected during the replay
    #[arg(long)]
    pub metrics: bool,
}

/// What a replay produced
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub session_id: String,
    pub events_replayed: usize,
    pub interactions: usize,
    pub page_views: usize,
    pub form_submissions: usize,
    pub click_events: usize,
    pub duration_ms: i64,
    pub export_path: Option<String>,
    #[serde(skip)]
    pub metrics: Option<String>,
}

impl ReplayCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);

        let mut config = if config_path.exists() {
            Config::load(config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?
        } else {
            Config::default()
        };
        if let Some(kind) = &self.sink {
            config.sink.kind = kind.clone();
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            bail!("Invalid configuration: {}", messages.join("; "));
        }

        let input = self.read_input()?;
        let records = parse_stream(&input)?;
        info!(records = records.len(), input = %self.input.display(), "Replaying event stream");

        let summary = self.run(&config, &records).await?;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&summary)?);
        } else {
            formatter.success(&format!("Replayed {} event(s)", summary.events_replayed));
            formatter.field("Session", &summary.session_id);
            formatter.field("Duration", &format_duration_ms(summary.duration_ms));
            formatter.field("Interactions", &summary.interactions.to_string());
            formatter.field("Page views", &summary.page_views.to_string());
            formatter.field("Form submissions", &summary.form_submissions.to_string());
            formatter.field("Clicks", &summary.click_events.to_string());
            if let Some(path) = &summary.export_path {
                formatter.field("Export", path);
            }
        }
        if let Some(metrics) = &summary.metrics {
            print!("{metrics}");
        }

        Ok(())
    }

    /// Replays `records` through a fresh page session.
    async fn run(&self, config: &Config, records: &[ReplayRecord]) -> Result<ReplaySummary> {
        let (sink, collector) = if config.sink.kind == "http" {
            let collector = Arc::new(HttpCollectorSink::from_config(&config.sink)?);
            (
                Some(collector.clone() as Arc<dyn IAnalyticsSink>),
                Some(collector),
            )
        } else {
            (build_sink(&config.sink)?, None)
        };
        let metrics = Arc::new(MetricsRegistry::new()?);

        let start = Utc::now();
        let clock = ManualClock::new(start);
        let capabilities = HostCapabilities {
            performance_observer: !self.no_performance_observer,
        };

        let mut page = PageSession::start(
            config,
            self.page_context(),
            capabilities,
            Arc::new(clock.clone()),
            sink,
            Some(metrics.clone()),
        )?;

        let mut last_offset = 0;
        for record in records {
            if record.at_ms < last_offset {
                warn!(
                    at_ms = record.at_ms,
                    previous = last_offset,
                    "Out-of-order record; keeping the clock where it is"
                );
            } else {
                last_offset = record.at_ms;
                clock.set(start + chrono::Duration::milliseconds(record.at_ms));
            }
            page.dispatch(&record.event);
        }
        page.teardown();

        let export_path;
        let export: UserStudyExport = if self.export {
            let store = ExportStore::new(config.export.dir.clone());
            let export = page.export(Some(&store as &dyn IArtifactTarget));
            let path = store.exports_dir().join(export.file_name());
            export_path = path.exists().then(|| path.display().to_string());
            export
        } else {
            export_path = None;
            page.export(None)
        };

        if let Some(collector) = collector {
            let grace = Duration::from_secs(config.sink.timeout_secs + 1);
            if !collector.drain(grace).await {
                warn!(
                    pending = collector.in_flight(),
                    "Collector deliveries still pending at exit"
                );
            }
        }

        Ok(ReplaySummary {
            session_id: export.session_id.to_string(),
            events_replayed: records.len(),
            interactions: export.interactions.len(),
            page_views: export.page_views.len(),
            form_submissions: export.form_submissions.len(),
            click_events: export.click_events.len(),
            duration_ms: export.total_duration,
            export_path,
            metrics: if self.metrics {
                Some(metrics.encode()?)
            } else {
                None
            },
        })
    }

    fn page_context(&self) -> PageContext {
        let mut context = PageContext::new(self.url.clone(), self.title.clone());
        if let Some(referrer) = &self.referrer {
            context = context.with_referrer(referrer.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            context = context.with_user_agent(user_agent.clone());
        }
        if let Some(screen) = self.screen {
            context = context.with_screen(screen);
        }
        if let Some(viewport) = self.viewport {
            context = context.with_viewport(viewport);
        }
        context
    }

    fn read_input(&self) -> Result<String> {
        if self.input.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event stream from stdin")?;
            Ok(buffer)
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input.display()))
        }
    }
}

/// Parses a JSON-lines stream. Blank lines and `#` comments are skipped.
pub fn parse_stream(input: &str) -> Result<Vec<ReplayRecord>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid replay record on line {}", index + 1))
        })
        .collect()
}
