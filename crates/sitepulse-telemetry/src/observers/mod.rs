//! Passive observers and host event dispatch
//!
//! Hosts deliver browser notifications (scroll, visibility, errors,
//! performance entries, load, unload) as [`HostEvent`] values. Observers
//! subscribe to the [`ObserverRegistry`], receive every event in
//! registration order and call back into the [`EventTracker`].
//!
//! Subscriptions are explicit: each registration returns a
//! [`Subscription`] handle and [`ObserverRegistry::teardown`] drops them
//! all when the page goes away.

pub mod error_capture;
pub mod performance;
pub mod scroll;
pub mod visibility;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sitepulse_core::domain::{Dimensions, ElementInfo, FormInfo, Parameters};
use tracing::debug;

use crate::tracker::EventTracker;

pub use error_capture::{ErrorCaptureObserver, ErrorDetails, Rejection, ScriptError};
pub use performance::{NavigationTiming, PerformanceEntry, WebVitalsObserver};
pub use scroll::{ScrollDepthObserver, ScrollSample};
pub use visibility::VisibilityObserver;

// ============================================================================
// HostEvent
// ============================================================================

/// A notification delivered by the host environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The page was scrolled
    Scroll(ScrollSample),
    /// The document became hidden or visible
    VisibilityChange { hidden: bool },
    /// The page is about to be unloaded
    Unload,
    /// An uncaught script error
    Error(ScriptError),
    /// A promise rejection nobody handled
    UnhandledRejection(Rejection),
    /// A batch of performance entries from the host's performance observer
    PerformanceEntries { entries: Vec<PerformanceEntry> },
    /// The page finished loading; navigation timing if the host has it
    Load {
        #[serde(default)]
        navigation: Option<NavigationTiming>,
    },
    /// The viewport was resized
    Resize { viewport: Dimensions },

    // Calls made by page code rather than by the host itself.
    /// `track(name, params)`
    Track {
        name: String,
        #[serde(default)]
        params: Parameters,
    },
    /// `track_page_view(title, url)`
    PageView {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    /// `track_user_interaction(element, type, extra)`
    Interaction {
        element: ElementInfo,
        interaction_type: String,
        #[serde(default)]
        extra: Parameters,
    },
    /// `track_form_interaction(form, action, data)`
    Form {
        #[serde(default)]
        form: FormInfo,
        action: String,
        #[serde(default)]
        data: BTreeMap<String, String>,
    },
    /// `track_user_study_event(type, data)`
    StudyEvent {
        event_type: String,
        #[serde(default)]
        data: Parameters,
    },
}

impl HostEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::Scroll(_) => "scroll",
            HostEvent::VisibilityChange { .. } => "visibility_change",
            HostEvent::Unload => "unload",
            HostEvent::Error(_) => "error",
            HostEvent::UnhandledRejection(_) => "unhandled_rejection",
            HostEvent::PerformanceEntries { .. } => "performance_entries",
            HostEvent::Load { .. } => "load",
            HostEvent::Resize { .. } => "resize",
            HostEvent::Track { .. } => "track",
            HostEvent::PageView { .. } => "page_view",
            HostEvent::Interaction { .. } => "interaction",
            HostEvent::Form { .. } => "form",
            HostEvent::StudyEvent { .. } => "study_event",
        }
    }
}

// ============================================================================
// IPageObserver and ObserverRegistry
// ============================================================================

/// A passive listener attached to the page for the life of the session
pub trait IPageObserver {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Reacts to one host event. Events the observer does not care about
    /// are ignored.
    fn handle(&mut self, event: &HostEvent, tracker: &mut EventTracker);
}

/// Handle returned for every registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Ordered set of subscribed observers
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(Subscription, Box<dyn IPageObserver>)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer after all existing ones.
    pub fn subscribe(&mut self, observer: Box<dyn IPageObserver>) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        debug!(observer = observer.name(), "Observer subscribed");
        self.observers.push((subscription, observer));
        subscription
    }

    /// Removes one observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| *s != subscription);
        self.observers.len() != before
    }

    /// Delivers `event` to every observer in registration order.
    pub fn dispatch(&mut self, event: &HostEvent, tracker: &mut EventTracker) {
        for (_, observer) in self.observers.iter_mut() {
            observer.handle(event, tracker);
        }
    }

    /// Drops every subscription and returns how many there were.
    pub fn teardown(&mut self) -> usize {
        let count = self.observers.len();
        self.observers.clear();
        debug!(count, "Observers torn down");
        count
    }

    /// Names of the subscribed observers, in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|(_, o)| o.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
