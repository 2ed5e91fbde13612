//! User study export snapshot
//!
//! A point-in-time copy of a session's logs plus device metadata, written
//! as pretty-printed JSON named `user_study_data_<session_id>.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitepulse_core::domain::{EventEnvelope, PageView, SessionId};

/// MIME type of the export artifact
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// File name prefix of export artifacts
pub const EXPORT_FILE_PREFIX: &str = "user_study_data_";

/// Snapshot of everything a session has recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStudyExport {
    pub session_id: SessionId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    /// Milliseconds between `start_time` and `end_time`
    pub total_duration: i64,
    pub interactions: Vec<EventEnvelope>,
    pub page_views: Vec<PageView>,
    pub form_submissions: Vec<EventEnvelope>,
    pub click_events: Vec<EventEnvelope>,
    pub user_agent: String,
    pub screen_resolution: String,
    pub viewport_size: String,
}

impl UserStudyExport {
    /// Artifact file name for a session.
    pub fn file_name_for(session_id: SessionId) -> String {
        format!("{EXPORT_FILE_PREFIX}{session_id}.json")
    }

    /// Artifact file name for this export.
    pub fn file_name(&self) -> String {
        Self::file_name_for(self.session_id)
    }

    /// Pretty-printed UTF-8 JSON document.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_session_id() {
        let id = SessionId::nil();
        assert_eq!(
            UserStudyExport::file_name_for(id),
            format!("user_study_data_{id}.json")
        );
    }
}
