//! Page session bootstrap
//!
//! [`PageSession`] wires one tracker and its observers together for a
//! single page load: it announces the session, optionally records the
//! initial page view and subscribes the passive observers allowed by the
//! configuration and the host's capabilities.

use std::sync::Arc;

use sitepulse_core::config::Config;
use sitepulse_core::domain::{DomainError, PageContext, Session};
use sitepulse_core::ports::{IAnalyticsSink, IArtifactTarget, IClock};
use tracing::{debug, info};

use crate::export::UserStudyExport;
use crate::metrics::MetricsRegistry;
use crate::observers::{
    ErrorCaptureObserver, HostEvent, ObserverRegistry, ScrollDepthObserver, VisibilityObserver,
    WebVitalsObserver,
};
use crate::tracker::EventTracker;

/// What the host environment can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The host delivers performance-observer entry batches (LCP, FID, CLS)
    pub performance_observer: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            performance_observer: true,
        }
    }
}

/// A tracker plus the observers attached to one page
pub struct PageSession {
    tracker: EventTracker,
    observers: ObserverRegistry,
}

impl PageSession {
    /// Starts tracking a page.
    ///
    /// Fails only if the configured scroll milestones are invalid.
    pub fn start(
        config: &Config,
        context: PageContext,
        capabilities: HostCapabilities,
        clock: Arc<dyn IClock>,
        sink: Option<Arc<dyn IAnalyticsSink>>,
        metrics: Option<Arc<MetricsRegistry>>,
    ) -> Result<Self, DomainError> {
        let scroll = ScrollDepthObserver::new(config.tracking.scroll_milestones.clone())?;

        let session = Session::start(clock.as_ref());
        let mut tracker = EventTracker::new(session, context, clock)
            .with_measurement_id(config.analytics.measurement_id.clone())
            .with_element_text_limit(config.tracking.element_text_limit);
        if let Some(sink) = sink {
            tracker = tracker.with_sink(sink);
        }
        if let Some(metrics) = metrics {
            tracker = tracker.with_metrics(metrics);
        }

        tracker.initialize();
        if config.analytics.track_initial_page_view {
            tracker.track_page_view(None, None);
        }

        let mut observers = ObserverRegistry::new();
        observers.subscribe(Box::new(scroll));
        observers.subscribe(Box::new(VisibilityObserver::new(tracker.clock().now())));
        if config.tracking.performance {
            observers.subscribe(Box::new(WebVitalsObserver::new(
                capabilities.performance_observer,
            )));
        }
        if config.tracking.capture_errors {
            observers.subscribe(Box::new(ErrorCaptureObserver::new()));
        }

        info!(
            session_id = %tracker.session().id(),
            observers = ?observers.names(),
            "Page session started"
        );
        Ok(Self { tracker, observers })
    }

    /// Routes one event: calls from page code go to the tracker, host
    /// notifications go to the observers.
    pub fn dispatch(&mut self, event: &HostEvent) {
        debug!(kind = event.kind(), "Dispatching host event");
        match event {
            HostEvent::Track { name, params } => {
                self.tracker.track(name, params.clone());
            }
            HostEvent::PageView { title, url } => {
                self.tracker
                    .track_page_view(title.as_deref(), url.as_deref());
            }
            HostEvent::Interaction {
                element,
                interaction_type,
                extra,
            } => {
                self.tracker
                    .track_user_interaction(element, interaction_type, extra.clone());
            }
            HostEvent::Form { form, action, data } => {
                self.tracker.track_form_interaction(form, action, data);
            }
            HostEvent::StudyEvent { event_type, data } => {
                self.tracker.track_user_study_event(event_type, data.clone());
            }
            HostEvent::Resize { viewport } => {
                let viewport = *viewport;
                self.tracker.update_page_context(|ctx| ctx.viewport = viewport);
                self.observers.dispatch(event, &mut self.tracker);
            }
            _ => self.observers.dispatch(event, &mut self.tracker),
        }
    }

    /// Unsubscribes every observer. Returns how many were removed.
    pub fn teardown(&mut self) -> usize {
        self.observers.teardown()
    }

    /// Snapshots the session, offering it to `target` if given.
    pub fn export(&self, target: Option<&dyn IArtifactTarget>) -> UserStudyExport {
        self.tracker.export_user_study_data(target)
    }

    pub fn tracker(&self) -> &EventTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut EventTracker {
        &mut self.tracker
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }
}
