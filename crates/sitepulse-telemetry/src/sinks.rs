//! Analytics sink adapters
//!
//! - [`MemorySink`]: keeps every call in memory (tests, dry runs)
//! - [`LogSink`]: writes each call as a structured `tracing` event
//! - [`HttpCollectorSink`]: POSTs each call as JSON to a collector endpoint
//!
//! [`build_sink`] picks one from the `sink` section of the configuration.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use sitepulse_core::config::SinkConfig;
use sitepulse_core::ports::{IAnalyticsSink, SinkCall};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

// ============================================================================
// MemorySink
// ============================================================================

/// Records calls instead of sending them
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<SinkCall>>,
    failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every call without recording it
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Copy of the calls received so far, in order
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IAnalyticsSink for MemorySink {
    fn send(&self, call: &SinkCall) -> Result<()> {
        if self.failing {
            bail!("memory sink configured to reject calls");
        }
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call.clone());
        Ok(())
    }
}

// ============================================================================
// LogSink
// ============================================================================

/// Emits calls on the `sitepulse::sink` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl IAnalyticsSink for LogSink {
    fn send(&self, call: &SinkCall) -> Result<()> {
        info!(
            target: "sitepulse::sink",
            command = %call.command,
            target_name = %call.target,
            options = %call.options,
            "Analytics call"
        );
        Ok(())
    }
}

// ============================================================================
// HttpCollectorSink
// ============================================================================

/// Fire-and-forget JSON POST to a collector endpoint
///
/// Each call is delivered on its own task spawned on the current tokio
/// runtime and registered with a [`TaskTracker`]. Delivery failures are
/// logged; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpCollectorSink {
    client: Client,
    endpoint: String,
    deliveries: TaskTracker,
}

impl HttpCollectorSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for collector sink")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            deliveries: TaskTracker::new(),
        })
    }

    /// Builds the sink from the `sink` configuration section.
    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .context("sink.endpoint is required for the http sink")?;
        Self::new(endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of spawned deliveries that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.deliveries.len()
    }

    /// Waits until every spawned delivery has finished or `timeout` passes.
    /// Returns `true` if nothing is left in flight.
    ///
    /// The sink keeps accepting calls afterwards.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.deliveries.close();
        let drained = tokio::time::timeout(timeout, self.deliveries.wait())
            .await
            .is_ok();
        self.deliveries.reopen();
        drained
    }

    /// Sends one call and waits for the collector to accept it.
    pub async fn deliver(&self, call: &SinkCall) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(call)
            .send()
            .await
            .with_context(|| format!("Failed to POST to collector at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Collector at {} responded with {}", self.endpoint, status);
        }

        debug!(command = %call.command, target = %call.target, "Collector accepted call");
        Ok(())
    }
}

impl IAnalyticsSink for HttpCollectorSink {
    fn send(&self, call: &SinkCall) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .context("No tokio runtime available; collector call dropped")?;

        let sink = self.clone();
        let call = call.clone();
        self.deliveries.spawn_on(
            async move {
                if let Err(e) = sink.deliver(&call).await {
                    warn!(error = %e, command = %call.command, "Collector delivery failed");
                }
            },
            &handle,
        );
        Ok(())
    }
}

// ============================================================================
// Selection from configuration
// ============================================================================

/// Builds the sink named by `config.kind`. `none` yields no sink.
pub fn build_sink(config: &SinkConfig) -> Result<Option<Arc<dyn IAnalyticsSink>>> {
    let sink: Arc<dyn IAnalyticsSink> = match config.kind.as_str() {
        "none" => return Ok(None),
        "log" => Arc::new(LogSink),
        "http" => Arc::new(HttpCollectorSink::from_config(config)?),
        other => bail!("Unknown sink kind '{other}'"),
    };
    Ok(Some(sink))
}
