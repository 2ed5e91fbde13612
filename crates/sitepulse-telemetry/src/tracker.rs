//! Event telemetry aggregator
//!
//! [`EventTracker`] is the single normalization point from "something
//! happened" to "a structured record is logged and forwarded". Every
//! operation builds an [`EventEnvelope`], forwards it to the analytics sink
//! when one is configured and appends it to the session log.
//!
//! The tracker is an explicit context object. Hosts create one per page
//! load and pass it by reference to whatever needs to track; there is no
//! global state.
//!
//! Nothing here returns an error to the caller: an absent or failing sink
//! degrades to local logging only.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use sitepulse_core::domain::{
    ElementInfo, EventCategory, EventEnvelope, FormInfo, PageContext, PageView, Parameters,
    Session, SessionLog,
};
use sitepulse_core::ports::{IAnalyticsSink, IArtifactTarget, IClock, SinkCall};
use tracing::{debug, info, warn};

use crate::export::{UserStudyExport, EXPORT_MIME_TYPE};
use crate::metrics::MetricsRegistry;
use crate::observers::error_capture::ErrorDetails;

/// Default number of characters of element text copied into interactions
pub const DEFAULT_ELEMENT_TEXT_LIMIT: usize = 50;

/// Default measurement id used for `config` sink calls
pub const DEFAULT_MEASUREMENT_ID: &str = "GA_MEASUREMENT_ID";

/// Collects, normalizes and forwards events for one session
pub struct EventTracker {
    session: Session,
    context: PageContext,
    log: SessionLog,
    clock: Arc<dyn IClock>,
    sink: Option<Arc<dyn IAnalyticsSink>>,
    metrics: Option<Arc<MetricsRegistry>>,
    measurement_id: String,
    element_text_limit: usize,
}

impl EventTracker {
    /// Creates a tracker for `session` with no sink and no metrics.
    pub fn new(session: Session, context: PageContext, clock: Arc<dyn IClock>) -> Self {
        Self {
            session,
            context,
            log: SessionLog::new(),
            clock,
            sink: None,
            metrics: None,
            measurement_id: DEFAULT_MEASUREMENT_ID.to_string(),
            element_text_limit: DEFAULT_ELEMENT_TEXT_LIMIT,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn IAnalyticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_measurement_id(mut self, measurement_id: impl Into<String>) -> Self {
        self.measurement_id = measurement_id.into();
        self
    }

    pub fn with_element_text_limit(mut self, limit: usize) -> Self {
        self.element_text_limit = limit;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn page_context(&self) -> &PageContext {
        &self.context
    }

    pub fn clock(&self) -> &dyn IClock {
        self.clock.as_ref()
    }

    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_deref()
    }

    /// Applies a change to the page context (navigation, resize).
    ///
    /// Later envelopes pick up the new values; recorded ones keep theirs.
    pub fn update_page_context(&mut self, update: impl FnOnce(&mut PageContext)) {
        update(&mut self.context);
    }

    // ========================================================================
    // Session announcement
    // ========================================================================

    /// Announces the session to the sink: page configuration, then the
    /// session id as a global parameter.
    pub fn initialize(&self) {
        if self.sink.is_none() {
            warn!(
                session_id = %self.session.id(),
                "No analytics sink configured; events will only be kept locally"
            );
            return;
        }

        self.forward(SinkCall::config(
            self.measurement_id.clone(),
            json!({
                "page_title": self.context.title,
                "page_location": self.context.url,
                "custom_map": {
                    "custom_parameter_1": "session_id",
                    "custom_parameter_2": "user_study_data",
                },
            }),
        ));
        self.forward(SinkCall::set(
            "session_id",
            json!(self.session.id().to_string()),
        ));

        info!(session_id = %self.session.id(), "Analytics initialized");
    }

    // ========================================================================
    // Tracking
    // ========================================================================

    /// Tracks an event, classifying it by name.
    pub fn track(&mut self, event_name: &str, parameters: Parameters) -> EventEnvelope {
        let category = EventCategory::classify(event_name);
        self.track_with_category(event_name, category, parameters)
    }

    /// Tracks an event under an explicit category.
    pub fn track_with_category(
        &mut self,
        event_name: &str,
        category: EventCategory,
        parameters: Parameters,
    ) -> EventEnvelope {
        let envelope = EventEnvelope::new(
            event_name,
            self.session.id(),
            self.clock.now(),
            &self.context,
            parameters,
        );

        if self.sink.is_some() {
            let label = envelope
                .param("event_label")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| json!(event_name));
            let value = envelope
                .param("value")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| json!(1));
            let serialized = serde_json::to_string(&envelope).unwrap_or_default();

            self.forward(SinkCall::event(
                event_name,
                json!({
                    "event_category": category,
                    "event_label": label,
                    "value": value,
                    "custom_parameter_1": self.session.id().to_string(),
                    "custom_parameter_2": serialized,
                }),
            ));
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_event(category);
        }

        self.log.record_interaction(envelope.clone());
        debug!(event = event_name, %category, "Event tracked");
        envelope
    }

    /// Records a page view, defaulting title and URL to the page context.
    pub fn track_page_view(&mut self, title: Option<&str>, url: Option<&str>) -> PageView {
        let page_view = PageView {
            page_title: title.unwrap_or(self.context.title.as_str()).to_string(),
            page_url: url.unwrap_or(self.context.url.as_str()).to_string(),
            referrer: self.context.referrer.clone(),
            timestamp: self.clock.now(),
            session_id: self.session.id(),
        };

        self.forward(SinkCall::config(
            self.measurement_id.clone(),
            json!({
                "page_title": page_view.page_title,
                "page_location": page_view.page_url,
                "custom_parameter_1": self.session.id().to_string(),
            }),
        ));

        self.log.record_page_view(page_view.clone());
        debug!(url = %page_view.page_url, "Page view tracked");
        page_view
    }

    /// Tracks an interaction with an element as `user_interaction_<type>`.
    ///
    /// `extra` is merged over the element description. Clicks are also
    /// recorded in the click-events log.
    pub fn track_user_interaction(
        &mut self,
        element: &ElementInfo,
        interaction_type: &str,
        extra: Parameters,
    ) -> EventEnvelope {
        let mut params = Parameters::new();
        params.insert(
            "element_type".into(),
            json!(element.tag_name.to_lowercase()),
        );
        params.insert(
            "element_id".into(),
            non_empty(element.id.as_deref()).map_or(Value::Null, |v| json!(v)),
        );
        params.insert(
            "element_class".into(),
            non_empty(element.class_name.as_deref()).map_or(Value::Null, |v| json!(v)),
        );
        params.insert(
            "element_text".into(),
            element
                .text_excerpt(self.element_text_limit)
                .map_or(Value::Null, Value::String),
        );
        params.insert("interaction_type".into(), json!(interaction_type));
        params.extend(extra);

        let envelope = self.track(&format!("user_interaction_{interaction_type}"), params);
        if interaction_type == "click" {
            self.log.record_click(envelope.clone());
        }
        envelope
    }

    /// Tracks a form action as `form_<action>` and records it as a form submission.
    ///
    /// Only field names and a filled count are reported, never values.
    pub fn track_form_interaction(
        &mut self,
        form: &FormInfo,
        action: &str,
        form_data: &BTreeMap<String, String>,
    ) -> EventEnvelope {
        let fields: Vec<&str> = form_data.keys().map(String::as_str).collect();
        let filled = form_data.values().filter(|v| !v.trim().is_empty()).count();

        let mut params = Parameters::new();
        params.insert(
            "form_id".into(),
            non_empty(form.id.as_deref()).map_or(Value::Null, |v| json!(v)),
        );
        params.insert("form_action".into(), json!(action));
        params.insert("form_fields".into(), json!(fields));
        params.insert("fields_filled".into(), json!(filled));

        let envelope = self.track(&format!("form_{action}"), params);
        self.log.record_form_submission(envelope.clone());
        envelope
    }

    /// Reports an application error as `error_occurred`.
    pub fn track_error(&mut self, error: &ErrorDetails, context: Value) -> EventEnvelope {
        let mut params = Parameters::new();
        params.insert("error_message".into(), json!(error.message));
        params.insert(
            "error_stack".into(),
            error.stack.as_deref().map_or(Value::Null, |s| json!(s)),
        );
        params.insert("error_type".into(), json!(error.kind_or_unknown()));
        params.insert("context".into(), context);

        if let Some(metrics) = &self.metrics {
            metrics.record_error(error.kind_or_unknown());
        }
        self.track("error_occurred", params)
    }

    /// Tracks a user-study specific event as `user_study_<event_type>`.
    pub fn track_user_study_event(&mut self, event_type: &str, data: Parameters) -> EventEnvelope {
        let mut params = Parameters::new();
        params.insert("event_type".into(), json!(event_type));
        params.extend(data);
        self.track(&format!("user_study_{event_type}"), params)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Snapshots the session and offers it to `target` as a JSON file.
    ///
    /// Takes `&self`: exporting never changes the logs. A failed offer is
    /// logged and the snapshot is still returned.
    pub fn export_user_study_data(&self, target: Option<&dyn IArtifactTarget>) -> UserStudyExport {
        let end_time = self.clock.now();
        let export = UserStudyExport {
            session_id: self.session.id(),
            start_time: self.session.started_at(),
            end_time,
            total_duration: self.session.elapsed_ms(end_time),
            interactions: self.log.interactions().to_vec(),
            page_views: self.log.page_views().to_vec(),
            form_submissions: self.log.form_submissions().to_vec(),
            click_events: self.log.click_events().to_vec(),
            user_agent: self.context.user_agent.clone(),
            screen_resolution: self.context.screen.to_string(),
            viewport_size: self.context.viewport.to_string(),
        };

        if let Some(target) = target {
            let file_name = export.file_name();
            let offered = export
                .to_pretty_json()
                .map_err(anyhow::Error::from)
                .and_then(|body| target.offer(&file_name, EXPORT_MIME_TYPE, body.as_bytes()));
            match offered {
                Ok(()) => {
                    info!(file = %file_name, records = self.log.len(), "User study data exported")
                }
                Err(e) => {
                    warn!(error = %e, file = %file_name, "Failed to offer user study export")
                }
            }
        }

        export
    }

    // ========================================================================
    // Sink forwarding
    // ========================================================================

    fn forward(&self, call: SinkCall) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.send(&call) {
            warn!(
                error = %e,
                command = %call.command,
                target = %call.target,
                "Analytics sink rejected call; event kept locally"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_sink_failure(call.command);
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
