//! Prometheus metrics registry for SitePulse
//!
//! Counts tracked events by category, scroll milestones, captured errors and
//! sink failures, and records web-vital measurements in a histogram.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use sitepulse_core::domain::EventCategory;
use sitepulse_core::ports::SinkCommand;

/// Central metrics registry holding all Prometheus metrics.
pub struct MetricsRegistry {
    registry: Registry,
    /// Counter: tracked events by category
    pub events_total: IntCounterVec,
    /// Counter: scroll milestones reached by depth
    pub scroll_milestones_total: IntCounterVec,
    /// Counter: captured application errors by kind
    pub errors_captured_total: IntCounterVec,
    /// Counter: sink calls that were not accepted, by command
    pub sink_failures_total: IntCounterVec,
    /// Histogram: web-vital values by metric (milliseconds, or unitless for CLS)
    pub web_vitals: HistogramVec,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with all metrics registered.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new_custom(Some("sitepulse".to_string()), None)?;

        let events_total = IntCounterVec::new(
            Opts::new("events_total", "Tracked events by category"),
            &["category"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        let scroll_milestones_total = IntCounterVec::new(
            Opts::new("scroll_milestones_total", "Scroll-depth milestones reached"),
            &["depth"],
        )?;
        registry.register(Box::new(scroll_milestones_total.clone()))?;

        let errors_captured_total = IntCounterVec::new(
            Opts::new("errors_captured_total", "Captured application errors"),
            &["kind"],
        )?;
        registry.register(Box::new(errors_captured_total.clone()))?;

        let sink_failures_total = IntCounterVec::new(
            Opts::new("sink_failures_total", "Sink calls that were not accepted"),
            &["command"],
        )?;
        registry.register(Box::new(sink_failures_total.clone()))?;

        let web_vitals = HistogramVec::new(
            HistogramOpts::new("web_vitals", "Core web vital measurements")
                .buckets(vec![0.1, 0.25, 100.0, 300.0, 2500.0, 4000.0, f64::INFINITY]),
            &["metric"],
        )?;
        registry.register(Box::new(web_vitals.clone()))?;

        Ok(Self {
            registry,
            events_total,
            scroll_milestones_total,
            errors_captured_total,
            sink_failures_total,
            web_vitals,
        })
    }

    // ========================================================================
    // Recording helpers
    // ========================================================================

    /// Record one tracked event.
    pub fn record_event(&self, category: EventCategory) {
        self.events_total
            .with_label_values(&[category.as_str()])
            .inc();
    }

    /// Record a scroll milestone being reached.
    pub fn record_scroll_milestone(&self, depth: u8) {
        let depth = depth.to_string();
        self.scroll_milestones_total
            .with_label_values(&[depth.as_str()])
            .inc();
    }

    /// Record a captured application error.
    pub fn record_error(&self, kind: &str) {
        self.errors_captured_total.with_label_values(&[kind]).inc();
    }

    /// Record a sink call that failed.
    pub fn record_sink_failure(&self, command: SinkCommand) {
        let command = command.to_string();
        self.sink_failures_total
            .with_label_values(&[command.as_str()])
            .inc();
    }

    /// Observe a web-vital value (`lcp`, `fid`, `cls`).
    pub fn observe_web_vital(&self, metric: &str, value: f64) {
        self.web_vitals.with_label_values(&[metric]).observe(value);
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registry_creation() {
        let registry = MetricsRegistry::new().expect("create registry");
        let output = registry.encode().expect("encode");
        assert!(output.is_empty() || output.contains("sitepulse"));
    }

    #[test]
    fn test_record_event() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_event(EventCategory::Interaction);
        registry.record_event(EventCategory::Interaction);
        registry.record_event(EventCategory::Conversion);

        assert_eq!(
            registry
                .events_total
                .with_label_values(&["interaction"])
                .get(),
            2
        );
        let output = registry.encode().unwrap();
        assert!(output.contains("sitepulse_events_total"));
        assert!(output.contains("conversion"));
    }

    #[test]
    fn test_record_scroll_milestone() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_scroll_milestone(25);
        registry.record_scroll_milestone(50);

        let output = registry.encode().unwrap();
        assert!(output.contains("sitepulse_scroll_milestones_total"));
        assert!(output.contains("depth=\"50\""));
    }

    #[test]
    fn test_record_error_and_sink_failure() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_error("TypeError");
        registry.record_sink_failure(SinkCommand::Event);

        let output = registry.encode().unwrap();
        assert!(output.contains("sitepulse_errors_captured_total"));
        assert!(output.contains("sitepulse_sink_failures_total"));
        assert!(output.contains("command=\"event\""));
    }

    #[test]
    fn test_observe_web_vital() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe_web_vital("lcp", 1200.0);

        let output = registry.encode().unwrap();
        assert!(output.contains("sitepulse_web_vitals"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }
}
