//! SitePulse Telemetry - Event tracking for marketing pages
//!
//! Provides:
//! - `EventTracker`: envelope construction, classification, session logs
//! - `observers`: scroll depth, visibility, error capture, web vitals
//! - `PageSession`: per-page bootstrap and host event routing
//! - `sinks`: in-memory, log and HTTP collector analytics sinks
//! - `ExportStore`: file-based user study export management
//! - `MetricsRegistry`: Prometheus counters and histograms

pub mod export;
pub mod metrics;
pub mod observers;
pub mod page;
pub mod sinks;
pub mod store;
pub mod tracker;

pub use export::UserStudyExport;
pub use metrics::MetricsRegistry;
pub use observers::{ErrorDetails, HostEvent, IPageObserver, ObserverRegistry, Subscription};
pub use page::{HostCapabilities, PageSession};
pub use sinks::{build_sink, HttpCollectorSink, LogSink, MemorySink};
pub use store::{ExportEntry, ExportStore};
pub use tracker::EventTracker;
