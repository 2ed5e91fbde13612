//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! aggregator. The domain core depends on them; implementations live in
//! the telemetry crate or in the host embedding it.
//!
//! ## Ports Overview
//!
//! - [`IAnalyticsSink`] - External analytics provider receiving forwarded events
//! - [`IArtifactTarget`] - Destination for files offered to the user (exports)
//! - [`IClock`] - Source of timestamps

pub mod analytics_sink;
pub mod artifact;
pub mod clock;

pub use analytics_sink::{IAnalyticsSink, SinkCall, SinkCommand};
pub use artifact::IArtifactTarget;
pub use clock::{IClock, ManualClock, SystemClock};
