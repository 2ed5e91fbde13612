//! HTTP collector sink against a mock collector

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sitepulse_core::config::ConfigBuilder;
use sitepulse_core::ports::IAnalyticsSink;
use sitepulse_telemetry::{build_sink, HostCapabilities, HostEvent, PageSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

async fn wait_for_requests(server: &MockServer, expected: usize) -> Vec<Value> {
    for _ in 0..100 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= expected {
            return requests
                .iter()
                .filter_map(|r| serde_json::from_slice(&r.body).ok())
                .collect();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("collector did not receive {expected} requests");
}

#[tokio::test]
async fn test_page_session_posts_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .sink_kind("http")
        .sink_endpoint(format!("{}/collect", server.uri()))
        .build();
    let sink = build_sink(&config.sink).unwrap();
    assert!(sink.is_some());

    let clock = common::clock();
    let mut page = PageSession::start(
        &config,
        common::context(),
        HostCapabilities::default(),
        Arc::new(clock.clone()),
        sink,
        None,
    )
    .unwrap();
    page.dispatch(&HostEvent::Track {
        name: "newsletter_signup".into(),
        params: Default::default(),
    });

    // config + set + initial page view + event
    let bodies = wait_for_requests(&server, 4).await;
    let event = bodies
        .iter()
        .find(|b| b["target"] == "newsletter_signup")
        .expect("event call delivered");
    assert_eq!(event["command"], "event");
    assert_eq!(event["options"]["event_category"], "conversion");
    assert_eq!(
        event["options"]["custom_parameter_1"],
        page.tracker().session().id().to_string()
    );
}

#[tokio::test]
async fn test_unreachable_collector_keeps_events_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = ConfigBuilder::new()
        .sink_kind("http")
        .sink_endpoint(format!("{}/collect", server.uri()))
        .track_initial_page_view(false)
        .build();
    let sink: Option<Arc<dyn IAnalyticsSink>> = build_sink(&config.sink).unwrap();

    let clock = common::clock();
    let mut page = PageSession::start(
        &config,
        common::context(),
        HostCapabilities::default(),
        Arc::new(clock.clone()),
        sink,
        None,
    )
    .unwrap();
    page.dispatch(&HostEvent::Track {
        name: "newsletter_signup".into(),
        params: Default::default(),
    });

    wait_for_requests(&server, 3).await;
    assert_eq!(page.tracker().log().interactions().len(), 1);
}
