//! Web vitals and page load timing
//!
//! LCP, FID and CLS are reported from the host's performance-observer
//! batches, each at most once per session. Page load timing comes from the
//! navigation entry delivered with the `load` event.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sitepulse_core::domain::Parameters;
use tracing::debug;

use super::{HostEvent, IPageObserver};
use crate::tracker::EventTracker;

/// Element name reported when the host does not provide one
const UNKNOWN_ELEMENT: &str = "unknown";

/// One entry of a performance-observer batch (times in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum PerformanceEntry {
    LargestContentfulPaint {
        start_time: f64,
        /// Tag name of the painted element
        #[serde(default)]
        element: Option<String>,
    },
    FirstInput {
        start_time: f64,
        processing_start: f64,
        #[serde(default)]
        name: Option<String>,
    },
    LayoutShift {
        value: f64,
        #[serde(default)]
        had_recent_input: bool,
    },
}

/// Navigation timing entry, milliseconds relative to the time origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    #[serde(default)]
    pub navigation_start: f64,
    pub dom_content_loaded_event_start: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_start: f64,
    pub load_event_end: f64,
}

impl NavigationTiming {
    pub fn dom_content_loaded(&self) -> f64 {
        self.dom_content_loaded_event_end - self.dom_content_loaded_event_start
    }

    pub fn load_complete(&self) -> f64 {
        self.load_event_end - self.load_event_start
    }

    pub fn total_load_time(&self) -> f64 {
        self.load_event_end - self.navigation_start
    }
}

/// Reports web vitals and load timing
#[derive(Debug, Clone, Default)]
pub struct WebVitalsObserver {
    vitals_supported: bool,
    lcp_reported: bool,
    fid_reported: bool,
    cls_reported: bool,
    load_reported: bool,
}

impl WebVitalsObserver {
    /// `vitals_supported` reflects whether the host has a performance
    /// observer. Without one, entry batches are ignored and only load
    /// timing is reported.
    pub fn new(vitals_supported: bool) -> Self {
        Self {
            vitals_supported,
            ..Self::default()
        }
    }

    fn on_entries(&mut self, entries: &[PerformanceEntry], tracker: &mut EventTracker) {
        if !self.vitals_supported {
            debug!(count = entries.len(), "Performance entries ignored; capability not reported");
            return;
        }

        if !self.lcp_reported {
            let last_lcp = entries.iter().rev().find_map(|entry| match entry {
                PerformanceEntry::LargestContentfulPaint { start_time, element } => {
                    Some((*start_time, element.as_deref()))
                }
                _ => None,
            });
            if let Some((start_time, element)) = last_lcp {
                self.lcp_reported = true;
                self.emit(
                    tracker,
                    "lcp_measured",
                    "lcp",
                    start_time,
                    &[("lcp_element", element.unwrap_or(UNKNOWN_ELEMENT))],
                );
            }
        }

        if !self.fid_reported {
            let first_input = entries.iter().find_map(|entry| match entry {
                PerformanceEntry::FirstInput {
                    start_time,
                    processing_start,
                    name,
                } => Some((processing_start - start_time, name.as_deref())),
                _ => None,
            });
            if let Some((delay, name)) = first_input {
                self.fid_reported = true;
                self.emit(
                    tracker,
                    "fid_measured",
                    "fid",
                    delay,
                    &[("fid_element", name.unwrap_or(UNKNOWN_ELEMENT))],
                );
            }
        }

        if !self.cls_reported {
            let mut shifts = entries
                .iter()
                .filter_map(|entry| match entry {
                    PerformanceEntry::LayoutShift {
                        value,
                        had_recent_input,
                    } => Some(if *had_recent_input { 0.0 } else { *value }),
                    _ => None,
                })
                .peekable();
            if shifts.peek().is_some() {
                let cls: f64 = shifts.sum();
                self.cls_reported = true;
                self.emit(tracker, "cls_measured", "cls", cls, &[]);
            }
        }
    }

    fn on_load(&mut self, navigation: Option<&NavigationTiming>, tracker: &mut EventTracker) {
        if self.load_reported {
            return;
        }
        let Some(timing) = navigation else {
            debug!("No navigation timing on load; skipping load performance");
            return;
        };

        self.load_reported = true;
        let mut params = Parameters::new();
        params.insert("dom_content_loaded".into(), json!(timing.dom_content_loaded()));
        params.insert("load_complete".into(), json!(timing.load_complete()));
        params.insert("total_load_time".into(), json!(timing.total_load_time()));
        tracker.track("page_load_performance", params);
    }

    fn emit(
        &self,
        tracker: &mut EventTracker,
        event_name: &str,
        metric: &str,
        value: f64,
        extra: &[(&str, &str)],
    ) {
        let mut params = Parameters::new();
        params.insert(format!("{metric}_value"), json!(value));
        for (key, val) in extra {
            params.insert((*key).to_string(), json!(val));
        }
        tracker.track(event_name, params);

        if let Some(metrics) = tracker.metrics() {
            metrics.observe_web_vital(metric, value);
        }
    }
}

impl IPageObserver for WebVitalsObserver {
    fn name(&self) -> &'static str {
        "web_vitals"
    }

    fn handle(&mut self, event: &HostEvent, tracker: &mut EventTracker) {
        match event {
            HostEvent::PerformanceEntries { entries } => self.on_entries(entries, tracker),
            HostEvent::Load { navigation } => self.on_load(navigation.as_ref(), tracker),
            _ => {}
        }
    }
}
