//! Shared helpers for page-session integration tests

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sitepulse_core::config::{Config, ConfigBuilder};
use sitepulse_core::domain::{Dimensions, PageContext};
use sitepulse_core::ports::{IAnalyticsSink, ManualClock};
use sitepulse_telemetry::observers::ScrollSample;
use sitepulse_telemetry::{HostCapabilities, HostEvent, MemorySink, PageSession};

/// Fixed start instant so durations are exact
pub fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap())
}

pub fn context() -> PageContext {
    PageContext::new("https://example.com/pricing", "Pricing")
        .with_referrer("https://search.example/")
        .with_user_agent("Mozilla/5.0 (X11; Linux x86_64)")
        .with_screen(Dimensions::new(2560, 1440))
        .with_viewport(Dimensions::new(1280, 720))
}

/// Configuration without the automatic initial page view
pub fn config() -> Config {
    ConfigBuilder::new().track_initial_page_view(false).build()
}

/// Starts a page session with a recording sink.
pub fn start_page(config: &Config, clock: &ManualClock) -> (PageSession, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let page = PageSession::start(
        config,
        context(),
        HostCapabilities::default(),
        Arc::new(clock.clone()),
        Some(sink.clone() as Arc<dyn IAnalyticsSink>),
        None,
    )
    .expect("valid configuration");
    (page, sink)
}

/// Scroll sample on a page with 1000px of scrollable distance
pub fn scroll(scroll_top: f64) -> HostEvent {
    HostEvent::Scroll(ScrollSample::new(scroll_top, 1720.0, 720.0))
}
