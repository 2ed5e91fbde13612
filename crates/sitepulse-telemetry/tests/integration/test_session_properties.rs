//! Session-level guarantees of a tracked page

use chrono::Duration;
use serde_json::{json, Value};
use sitepulse_core::domain::{ElementInfo, EventCategory, FormInfo};
use sitepulse_telemetry::observers::{PerformanceEntry, ScriptError};
use sitepulse_telemetry::HostEvent;

use crate::common;

#[test]
fn test_every_envelope_carries_the_session_id() {
    let clock = common::clock();
    let (mut page, sink) = common::start_page(&common::config(), &clock);
    let session_id = page.tracker().session().id();

    let events = vec![
        HostEvent::PageView {
            title: None,
            url: None,
        },
        common::scroll(400.0),
        HostEvent::VisibilityChange { hidden: true },
        HostEvent::VisibilityChange { hidden: false },
        HostEvent::Interaction {
            element: ElementInfo::new("A").with_id("nav-docs"),
            interaction_type: "click".into(),
            extra: Default::default(),
        },
        HostEvent::Error(ScriptError {
            message: "undefined is not a function".into(),
            filename: Some("main.js".into()),
            lineno: Some(7),
            colno: Some(1),
            stack: None,
            kind: Some("TypeError".into()),
        }),
        HostEvent::PerformanceEntries {
            entries: vec![PerformanceEntry::LargestContentfulPaint {
                start_time: 1800.0,
                element: Some("IMG".into()),
            }],
        },
        HostEvent::Unload,
    ];
    for event in &events {
        clock.advance(Duration::milliseconds(250));
        page.dispatch(event);
    }

    let log = page.tracker().log();
    assert!(!log.interactions().is_empty());
    assert!(log.interactions().iter().all(|e| e.session_id() == session_id));
    assert!(log.page_views().iter().all(|v| v.session_id == session_id));
    assert!(log.click_events().iter().all(|e| e.session_id() == session_id));

    let session = session_id.to_string();
    for call in sink.calls().iter().filter(|c| c.target != "session_id") {
        if let Some(value) = call.options.get("custom_parameter_1") {
            assert_eq!(value, &json!(session));
        }
    }
}

#[test]
fn test_scroll_milestones_fire_once_in_order() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);

    for top in [100.0, 300.0, 200.0, 900.0, 600.0, 950.0, 1000.0, 0.0, 1000.0] {
        page.dispatch(&common::scroll(top));
    }

    let depths: Vec<u64> = page
        .tracker()
        .log()
        .interactions()
        .iter()
        .filter(|e| e.event_name() == "scroll_depth_reached")
        .filter_map(|e| e.param("depth_percentage").and_then(Value::as_u64))
        .collect();
    assert_eq!(depths, vec![25, 50, 75, 90, 100]);
}

#[test]
fn test_non_scrollable_page_reports_no_milestones() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);

    page.dispatch(&HostEvent::Scroll(
        sitepulse_telemetry::observers::ScrollSample::new(0.0, 500.0, 720.0),
    ));
    page.dispatch(&HostEvent::Unload);

    let log = page.tracker().log();
    assert!(log
        .interactions()
        .iter()
        .all(|e| e.event_name() != "scroll_depth_reached"));
    let exit = log
        .interactions()
        .iter()
        .find(|e| e.event_name() == "page_exit")
        .expect("page_exit recorded");
    assert_eq!(exit.param("max_scroll_depth"), Some(&json!(0)));
    assert_eq!(exit.param("total_scroll_events"), Some(&json!(1)));
}

#[test]
fn test_form_submission_counts_filled_fields() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);

    page.dispatch(&HostEvent::Form {
        form: FormInfo::new("contact-form"),
        action: "submit".into(),
        data: [("a", "x"), ("b", ""), ("c", "y")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    });

    let log = page.tracker().log();
    let envelope = &log.form_submissions()[0];
    assert_eq!(envelope.event_name(), "form_submit");
    assert_eq!(envelope.param("fields_filled"), Some(&json!(2)));
    assert_eq!(envelope.param("form_fields"), Some(&json!(["a", "b", "c"])));
}

#[test]
fn test_classification_examples() {
    assert_eq!(EventCategory::classify("button_click_demo"), EventCategory::Interaction);
    assert_eq!(EventCategory::classify("signup_form_complete"), EventCategory::Conversion);
    assert_eq!(EventCategory::classify("scroll_milestone"), EventCategory::Engagement);
    assert_eq!(EventCategory::classify("anything_else"), EventCategory::Interaction);
}

#[test]
fn test_page_view_and_action_scenario() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);
    let session_id = page.tracker().session().id();

    page.dispatch(&HostEvent::PageView {
        title: None,
        url: None,
    });
    page.dispatch(&HostEvent::Track {
        name: "demo_action_added".into(),
        params: Default::default(),
    });

    let export = page.export(None);
    assert_eq!(export.page_views.len(), 1);
    assert_eq!(export.interactions.len(), 1);
    assert_eq!(export.session_id, session_id);
    assert_eq!(export.page_views[0].session_id, session_id);
    assert_eq!(export.interactions[0].session_id(), session_id);
}

#[test]
fn test_log_preserves_call_order() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);

    for name in ["first_step", "second_step", "third_step"] {
        page.dispatch(&HostEvent::Track {
            name: name.into(),
            params: Default::default(),
        });
    }
    let names: Vec<_> = page
        .tracker()
        .log()
        .interactions()
        .iter()
        .map(|e| e.event_name())
        .collect();
    assert_eq!(names, vec!["first_step", "second_step", "third_step"]);
}
