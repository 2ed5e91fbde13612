//! Scroll-depth tracking
//!
//! Reports each configured milestone the first time the page is scrolled
//! past it, and a `page_exit` summary on unload.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sitepulse_core::config::check_scroll_milestones;
use sitepulse_core::domain::{DomainError, Parameters};

use super::{HostEvent, IPageObserver};
use crate::tracker::EventTracker;

/// One scroll notification from the host, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    /// Vertical scroll offset of the document
    pub scroll_top: f64,
    /// Full scrollable height of the document
    pub document_height: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
}

impl ScrollSample {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Distance that can actually be scrolled
    pub fn scrollable_height(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    /// Rounded percentage scrolled, clamped to 0..=100.
    ///
    /// `None` for pages that cannot scroll or nonsensical samples.
    pub fn percentage(&self) -> Option<u8> {
        let scrollable = self.scrollable_height();
        if !(scrollable > 0.0) || !self.scroll_top.is_finite() {
            return None;
        }
        let pct = (self.scroll_top / scrollable * 100.0).round().clamp(0.0, 100.0);
        Some(pct as u8)
    }
}

/// Tracks the deepest milestone reached and the number of scroll samples
#[derive(Debug, Clone)]
pub struct ScrollDepthObserver {
    milestones: Vec<u8>,
    max_depth: u8,
    samples: u64,
}

impl ScrollDepthObserver {
    /// Creates an observer for a strictly ascending milestone set.
    pub fn new(milestones: Vec<u8>) -> Result<Self, DomainError> {
        check_scroll_milestones(&milestones)?;
        Ok(Self {
            milestones,
            max_depth: 0,
            samples: 0,
        })
    }

    /// Deepest milestone reached so far (0 before the first one)
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Number of scroll samples seen
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Processes one sample, emitting `scroll_depth_reached` for every
    /// milestone crossed for the first time.
    pub fn record(&mut self, sample: &ScrollSample, tracker: &mut EventTracker) {
        self.samples += 1;
        let Some(pct) = sample.percentage() else {
            return;
        };

        for &milestone in &self.milestones {
            if pct >= milestone && self.max_depth < milestone {
                self.max_depth = milestone;
                let mut params = Parameters::new();
                params.insert("depth_percentage".into(), json!(milestone));
                params.insert("scroll_position".into(), json!(sample.scroll_top));
                params.insert("page_height".into(), json!(sample.scrollable_height()));
                tracker.track("scroll_depth_reached", params);

                if let Some(metrics) = tracker.metrics() {
                    metrics.record_scroll_milestone(milestone);
                }
            }
        }
    }

    fn report_exit(&self, tracker: &mut EventTracker) {
        let elapsed = tracker.session().elapsed_ms(tracker.clock().now());
        let mut params = Parameters::new();
        params.insert("max_scroll_depth".into(), json!(self.max_depth));
        params.insert("total_scroll_events".into(), json!(self.samples));
        params.insert("time_on_page".into(), json!(elapsed));
        tracker.track("page_exit", params);
    }
}

impl IPageObserver for ScrollDepthObserver {
    fn name(&self) -> &'static str {
        "scroll_depth"
    }

    fn handle(&mut self, event: &HostEvent, tracker: &mut EventTracker) {
        match event {
            HostEvent::Scroll(sample) => self.record(sample, tracker),
            HostEvent::Unload => self.report_exit(tracker),
            _ => {}
        }
    }
}
