//! User study export artifact

use chrono::Duration;
use sitepulse_core::domain::ElementInfo;
use sitepulse_core::ports::IArtifactTarget;
use sitepulse_telemetry::{ExportStore, HostEvent, UserStudyExport};

use crate::common;

#[test]
fn test_repeated_exports_differ_only_in_timing() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);
    page.dispatch(&HostEvent::PageView {
        title: None,
        url: None,
    });
    page.dispatch(&HostEvent::Interaction {
        element: ElementInfo::new("BUTTON").with_text("Book a demo"),
        interaction_type: "click".into(),
        extra: Default::default(),
    });

    clock.advance(Duration::seconds(3));
    let first = page.export(None);
    clock.advance(Duration::seconds(2));
    let second = page.export(None);

    assert_ne!(first.end_time, second.end_time);
    assert_eq!(second.total_duration - first.total_duration, 2_000);

    let mut normalized = second.clone();
    normalized.end_time = first.end_time;
    normalized.total_duration = first.total_duration;
    assert_eq!(normalized, first);
}

#[test]
fn test_export_written_to_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ExportStore::new(dir.path().join("exports"));
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);

    page.dispatch(&HostEvent::Track {
        name: "newsletter_signup".into(),
        params: Default::default(),
    });
    clock.advance(Duration::minutes(1));
    let export = page.export(Some(&store as &dyn IArtifactTarget));

    let path = dir.path().join("exports").join(export.file_name());
    let content = std::fs::read_to_string(&path).expect("export file written");
    assert!(content.contains('\n'), "export is pretty-printed");

    let parsed: UserStudyExport = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, export);
    assert_eq!(parsed.total_duration, 60_000);
    assert_eq!(parsed.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
    assert_eq!(parsed.screen_resolution, "2560x1440");
    assert_eq!(parsed.viewport_size, "1280x720");

    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, export.session_id.to_string());
}

struct BrokenTarget;

impl IArtifactTarget for BrokenTarget {
    fn offer(&self, _file_name: &str, _mime_type: &str, _contents: &[u8]) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[test]
fn test_failed_offer_still_returns_snapshot() {
    let clock = common::clock();
    let (mut page, _) = common::start_page(&common::config(), &clock);
    page.dispatch(&HostEvent::Track {
        name: "demo_action_added".into(),
        params: Default::default(),
    });

    let export = page.export(Some(&BrokenTarget as &dyn IArtifactTarget));
    assert_eq!(export.interactions.len(), 1);
    assert_eq!(page.tracker().log().interactions().len(), 1);
}
