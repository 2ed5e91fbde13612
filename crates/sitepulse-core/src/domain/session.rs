//! Session and session log
//!
//! A [`Session`] is the telemetry identity of one page load. Its
//! [`SessionLog`] keeps every tracked record for the lifetime of the page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::{EventEnvelope, PageView};
use super::newtypes::SessionId;
use crate::ports::clock::IClock;

/// Telemetry identity of one page load
///
/// Created once when tracking starts and dropped with the page. A new page
/// load always gets a new session; nothing is carried across navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Starts a new session with a fresh id, stamped with the clock's time.
    pub fn start(clock: &dyn IClock) -> Self {
        Self {
            id: SessionId::new(),
            started_at: clock.now(),
        }
    }

    /// Rebuilds a session from known values
    pub fn with_id(id: SessionId, started_at: DateTime<Utc>) -> Self {
        Self { id, started_at }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Milliseconds elapsed between session start and `now` (never negative).
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_milliseconds().max(0)
    }
}

/// Append-only record of everything tracked during a session
///
/// There is no removal API; the log grows for the life of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    interactions: Vec<EventEnvelope>,
    page_views: Vec<PageView>,
    form_submissions: Vec<EventEnvelope>,
    click_events: Vec<EventEnvelope>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_interaction(&mut self, envelope: EventEnvelope) {
        self.interactions.push(envelope);
    }

    pub fn record_page_view(&mut self, page_view: PageView) {
        self.page_views.push(page_view);
    }

    pub fn record_form_submission(&mut self, envelope: EventEnvelope) {
        self.form_submissions.push(envelope);
    }

    pub fn record_click(&mut self, envelope: EventEnvelope) {
        self.click_events.push(envelope);
    }

    pub fn interactions(&self) -> &[EventEnvelope] {
        &self.interactions
    }

    pub fn page_views(&self) -> &[PageView] {
        &self.page_views
    }

    pub fn form_submissions(&self) -> &[EventEnvelope] {
        &self.form_submissions
    }

    pub fn click_events(&self) -> &[EventEnvelope] {
        &self.click_events
    }

    /// Total number of records across all four sequences
    pub fn len(&self) -> usize {
        self.interactions.len()
            + self.page_views.len()
            + self.form_submissions.len()
            + self.click_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
