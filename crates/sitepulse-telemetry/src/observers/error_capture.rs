//! Application error capture
//!
//! Turns uncaught script errors, unhandled rejections and Rust errors into
//! `error_occurred` events. Capturing must never fail the caller: the
//! tracker call runs under `catch_unwind` and anything that goes wrong is
//! logged and dropped.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::{HostEvent, IPageObserver};
use crate::tracker::EventTracker;

/// Error type reported when the source does not name one
pub const UNKNOWN_ERROR_TYPE: &str = "Unknown";

/// Normalized description of an application error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub stack: Option<String>,
    /// Error class name (`TypeError`, `io::Error`, ...)
    pub kind: Option<String>,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            kind: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Builds details from a Rust error. The `source()` chain becomes the
    /// stack, one `caused by:` line per level.
    pub fn from_std_error(error: &(dyn std::error::Error + 'static), kind: &str) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        let details = Self::new(error.to_string()).with_kind(kind);
        if chain.is_empty() {
            details
        } else {
            details.with_stack(chain.join("\n"))
        }
    }

    pub fn kind_or_unknown(&self) -> &str {
        self.kind
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(UNKNOWN_ERROR_TYPE)
    }
}

/// An uncaught script error as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptError {
    pub message: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub lineno: Option<u32>,
    #[serde(default)]
    pub colno: Option<u32>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl ScriptError {
    fn details(&self) -> ErrorDetails {
        ErrorDetails {
            message: self.message.clone(),
            stack: self.stack.clone(),
            kind: self.kind.clone(),
        }
    }

    fn context(&self) -> Value {
        json!({
            "filename": self.filename,
            "lineno": self.lineno,
            "colno": self.colno,
        })
    }
}

/// A rejected promise nobody handled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Subscribes to host error notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorCaptureObserver;

impl ErrorCaptureObserver {
    pub fn new() -> Self {
        Self
    }

    /// Records a Rust error as `error_occurred`, keeping its source chain.
    pub fn capture_std_error(
        tracker: &mut EventTracker,
        error: &(dyn std::error::Error + 'static),
        kind: &str,
        context: Value,
    ) {
        capture(tracker, &ErrorDetails::from_std_error(error, kind), context);
    }
}

impl IPageObserver for ErrorCaptureObserver {
    fn name(&self) -> &'static str {
        "error_capture"
    }

    fn handle(&mut self, event: &HostEvent, tracker: &mut EventTracker) {
        match event {
            HostEvent::Error(error) => capture(tracker, &error.details(), error.context()),
            HostEvent::UnhandledRejection(rejection) => {
                let details = ErrorDetails {
                    message: rejection.reason.clone(),
                    stack: rejection.stack.clone(),
                    kind: rejection.kind.clone(),
                };
                capture(
                    tracker,
                    &details,
                    json!({ "type": "unhandled_promise_rejection" }),
                );
            }
            _ => {}
        }
    }
}

fn capture(tracker: &mut EventTracker, details: &ErrorDetails, context: Value) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        tracker.track_error(details, context);
    }));

    if let Err(payload) = outcome {
        let reason = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        warn!(
            error = %details.message,
            %reason,
            "Error capture failed; error dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Arc;

    use chrono::Utc;
    use sitepulse_core::domain::{PageContext, Session};
    use sitepulse_core::ports::{IAnalyticsSink, ManualClock, SinkCall};

    use super::*;

    fn tracker() -> EventTracker {
        let clock = ManualClock::new(Utc::now());
        EventTracker::new(Session::start(&clock), PageContext::default(), Arc::new(clock))
    }

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "export failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "permission denied")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    struct PanickingSink;

    impl IAnalyticsSink for PanickingSink {
        fn send(&self, _call: &SinkCall) -> anyhow::Result<()> {
            panic!("sink exploded");
        }
    }

    #[test]
    fn kind_defaults_to_unknown() {
        assert_eq!(ErrorDetails::new("x").kind_or_unknown(), "Unknown");
        assert_eq!(ErrorDetails::new("x").with_kind("").kind_or_unknown(), "Unknown");
        assert_eq!(
            ErrorDetails::new("x").with_kind("TypeError").kind_or_unknown(),
            "TypeError"
        );
    }

    #[test]
    fn std_error_chain_becomes_stack() {
        let details = ErrorDetails::from_std_error(&Outer(Inner), "io");
        assert_eq!(details.message, "export failed");
        assert_eq!(details.stack.as_deref(), Some("caused by: permission denied"));
        assert_eq!(details.kind.as_deref(), Some("io"));

        let leaf = ErrorDetails::from_std_error(&Inner, "io");
        assert_eq!(leaf.stack, None);
    }

    #[test]
    fn script_error_carries_location_context() {
        let mut tracker = tracker();
        let event = HostEvent::Error(ScriptError {
            message: "x is undefined".into(),
            filename: Some("app.js".into()),
            lineno: Some(12),
            colno: Some(4),
            stack: Some("at main (app.js:12:4)".into()),
            kind: Some("TypeError".into()),
        });

        ErrorCaptureObserver::new().handle(&event, &mut tracker);

        let envelope = &tracker.log().interactions()[0];
        assert_eq!(envelope.event_name(), "error_occurred");
        assert_eq!(envelope.param("error_type"), Some(&json!("TypeError")));
        assert_eq!(
            envelope.param("context"),
            Some(&json!({"filename": "app.js", "lineno": 12, "colno": 4}))
        );
    }

    #[test]
    fn rejection_is_tagged() {
        let mut tracker = tracker();
        let event = HostEvent::UnhandledRejection(Rejection {
            reason: "network down".into(),
            stack: None,
            kind: None,
        });

        ErrorCaptureObserver::new().handle(&event, &mut tracker);

        let envelope = &tracker.log().interactions()[0];
        assert_eq!(envelope.param("error_message"), Some(&json!("network down")));
        assert_eq!(
            envelope.param("context"),
            Some(&json!({"type": "unhandled_promise_rejection"}))
        );
    }

    #[test]
    fn capture_std_error_records_chain() {
        let mut tracker = tracker();
        ErrorCaptureObserver::capture_std_error(&mut tracker, &Outer(Inner), "io", Value::Null);
        let envelope = &tracker.log().interactions()[0];
        assert_eq!(
            envelope.param("error_stack"),
            Some(&json!("caused by: permission denied"))
        );
    }

    #[test]
    fn panicking_sink_is_swallowed() {
        let clock = ManualClock::new(Utc::now());
        let mut tracker =
            EventTracker::new(Session::start(&clock), PageContext::default(), Arc::new(clock))
                .with_sink(Arc::new(PanickingSink));

        let event = HostEvent::UnhandledRejection(Rejection {
            reason: "boom".into(),
            stack: None,
            kind: None,
        });
        ErrorCaptureObserver::new().handle(&event, &mut tracker);
    }
}
