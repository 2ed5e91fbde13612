//! Analytics sink port (driven/secondary port)
//!
//! This module defines the interface for forwarding events to an external
//! analytics provider. Calls follow the conventional three-argument tag
//! shape `(command, target, options)`: `config` with a measurement id,
//! `set` with a property name, or `event` with an event name.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because delivery errors are adapter-specific.
//! - Sends are fire-and-forget. Callers log a failure and move on; nothing
//!   is retried or queued.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// SinkCommand and SinkCall
// ============================================================================

/// First positional argument of a sink call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkCommand {
    /// Configure a property (measurement id) with page options
    Config,
    /// Set a global parameter
    Set,
    /// Report an event
    Event,
}

impl std::fmt::Display for SinkCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SinkCommand::Config => "config",
            SinkCommand::Set => "set",
            SinkCommand::Event => "event",
        };
        write!(f, "{}", s)
    }
}

/// One call to the analytics sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkCall {
    pub command: SinkCommand,
    /// Measurement id, parameter name or event name depending on `command`
    pub target: String,
    pub options: Value,
}

impl SinkCall {
    pub fn new(command: SinkCommand, target: impl Into<String>, options: Value) -> Self {
        Self {
            command,
            target: target.into(),
            options,
        }
    }

    pub fn config(measurement_id: impl Into<String>, options: Value) -> Self {
        Self::new(SinkCommand::Config, measurement_id, options)
    }

    pub fn set(name: impl Into<String>, value: Value) -> Self {
        Self::new(SinkCommand::Set, name, value)
    }

    pub fn event(event_name: impl Into<String>, options: Value) -> Self {
        Self::new(SinkCommand::Event, event_name, options)
    }
}

// ============================================================================
// IAnalyticsSink trait
// ============================================================================

/// Port trait for an external analytics provider
///
/// ## Implementation Notes
///
/// - `send` must not block for long; network adapters hand the call to a
///   background task and return immediately.
/// - An error means the call was not accepted. The tracker keeps the event
///   in its local log either way.
pub trait IAnalyticsSink: Send + Sync {
    /// Forwards one call to the provider
    fn send(&self, call: &SinkCall) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn constructors_set_command() {
        assert_eq!(SinkCall::config("G-1", json!({})).command, SinkCommand::Config);
        assert_eq!(SinkCall::set("session_id", json!("x")).command, SinkCommand::Set);
        let call = SinkCall::event("page_exit", json!({"value": 1}));
        assert_eq!(call.command, SinkCommand::Event);
        assert_eq!(call.target, "page_exit");
    }

    #[test]
    fn command_display_and_serde() {
        assert_eq!(SinkCommand::Event.to_string(), "event");
        let json = serde_json::to_string(&SinkCommand::Config).unwrap();
        assert_eq!(json, "\"config\"");
    }
}
