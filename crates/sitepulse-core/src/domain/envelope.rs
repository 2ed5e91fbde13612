//! Event envelope and page-view records
//!
//! An [`EventEnvelope`] is the normalized record produced for every tracked
//! occurrence. It always carries the session id and a timestamp, plus the
//! page/device metadata current at the time of tracking, and whatever
//! parameters the caller supplied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::newtypes::SessionId;
use super::page::PageContext;

/// Caller-supplied event parameters
pub type Parameters = Map<String, Value>;

/// Envelope fields that caller parameters may not override.
pub const RESERVED_FIELDS: &[&str] = &[
    "event_name",
    "timestamp",
    "session_id",
    "page_url",
    "user_agent",
    "screen_resolution",
    "viewport_size",
];

/// Normalized record of a single tracked event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    session_id: SessionId,
    page_url: String,
    user_agent: String,
    screen_resolution: String,
    viewport_size: String,
    #[serde(flatten)]
    params: Parameters,
}

impl EventEnvelope {
    /// Builds an envelope from the page context and caller parameters.
    ///
    /// Parameters named like a reserved envelope field are discarded.
    pub fn new(
        event_name: impl Into<String>,
        session_id: SessionId,
        timestamp: DateTime<Utc>,
        context: &PageContext,
        mut params: Parameters,
    ) -> Self {
        params.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
        Self {
            event_name: event_name.into(),
            timestamp,
            session_id,
            page_url: context.url.clone(),
            user_agent: context.user_agent.clone(),
            screen_resolution: context.screen.to_string(),
            viewport_size: context.viewport.to_string(),
            params,
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn screen_resolution(&self) -> &str {
        &self.screen_resolution
    }

    pub fn viewport_size(&self) -> &str {
        &self.viewport_size
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Looks up a single caller parameter.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// A page view as recorded in the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub page_title: String,
    pub page_url: String,
    pub referrer: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
}
