//! Page visibility tracking

use chrono::{DateTime, Utc};
use serde_json::json;
use sitepulse_core::domain::Parameters;

use super::{HostEvent, IPageObserver};
use crate::tracker::EventTracker;

/// Measures active time between visibility changes
///
/// Every change notification emits an event, even if the state did not
/// actually flip.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    active: bool,
    active_since: DateTime<Utc>,
}

impl VisibilityObserver {
    /// Starts in the active state at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            active: true,
            active_since: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn on_change(&mut self, hidden: bool, tracker: &mut EventTracker) {
        let now = tracker.clock().now();
        if hidden {
            let active_ms = (now - self.active_since).num_milliseconds().max(0);
            self.active = false;
            let mut params = Parameters::new();
            params.insert("time_on_page_ms".into(), json!(active_ms));
            tracker.track("page_inactive", params);
        } else {
            self.active_since = now;
            self.active = true;
            tracker.track("page_active", Parameters::new());
        }
    }
}

impl IPageObserver for VisibilityObserver {
    fn name(&self) -> &'static str {
        "visibility"
    }

    fn handle(&mut self, event: &HostEvent, tracker: &mut EventTracker) {
        match event {
            HostEvent::VisibilityChange { hidden } => self.on_change(*hidden, tracker),
            HostEvent::Unload => {
                let now = tracker.clock().now();
                let total = (now - self.active_since).num_milliseconds().max(0);
                let mut params = Parameters::new();
                params.insert("total_time_ms".into(), json!(total));
                tracker.track("page_exit_total_time", params);
            }
            _ => {}
        }
    }
}
