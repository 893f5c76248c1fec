//! SSE client against wiremock `text/event-stream` responses

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use rdm_sync::client::transport::{ConnectionStatus, ReconnectPolicy, SseClient};
use rdm_sync::shared::{SseData, SseEvent};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::assertions::eventually;

const WAIT: Duration = Duration::from_secs(5);

fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

fn record_statuses(client: &SseClient) -> (Arc<Mutex<Vec<ConnectionStatus>>>, rdm_sync::client::Subscription) {
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = statuses.clone();
    let subscription = client.on_status_change(move |status: &ConnectionStatus| {
        sink.lock().unwrap().push(*status);
    });
    (statuses, subscription)
}

#[tokio::test]
async fn test_events_are_parsed_and_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("accept", "text/event-stream"))
        .respond_with(event_stream(
            ": keep-alive\n\
             event: change\n\
             data: {\"type\":\"wallet\"}\n\n\
             id: 7\n\
             data: first line\n\
             data: second line\n\n",
        ))
        .mount(&server)
        .await;

    let client = SseClient::with_policy(format!("{}/events", server.uri()), ReconnectPolicy::disabled());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _events = client.on_event(move |event: &SseEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    let (statuses, _status) = record_statuses(&client);

    client.connect();
    eventually(WAIT, || events.lock().unwrap().len() == 2, "two events").await;
    eventually(
        WAIT,
        || client.status() == ConnectionStatus::Disconnected,
        "stream end",
    )
    .await;

    let events = events.lock().unwrap();
    assert_eq!(events[0].event.as_deref(), Some("change"));
    assert_eq!(events[0].parse_data(), SseData::Parsed(json!({"type": "wallet"})));
    assert_eq!(events[1].data, "first line\nsecond line");
    assert_eq!(client.last_event_id().as_deref(), Some("7"));

    let statuses = statuses.lock().unwrap();
    assert_eq!(statuses[0], ConnectionStatus::Connecting);
    assert_eq!(statuses[1], ConnectionStatus::Connected);
    assert_eq!(*statuses.last().unwrap(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_server_error_reports_error_then_disconnected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SseClient::with_policy(format!("{}/events", server.uri()), ReconnectPolicy::disabled());
    let (statuses, _status) = record_statuses(&client);

    client.connect();
    eventually(WAIT, || statuses.lock().unwrap().len() == 3, "three transitions").await;

    assert_eq!(
        *statuses.lock().unwrap(),
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Error,
            ConnectionStatus::Disconnected
        ]
    );
}

#[tokio::test]
async fn test_unparseable_data_is_kept_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(event_stream("data: refresh everything\n\n"))
        .mount(&server)
        .await;

    let client = SseClient::with_policy(format!("{}/events", server.uri()), ReconnectPolicy::disabled());
    let data = Arc::new(Mutex::new(None));
    let sink = data.clone();
    let _events = client.on_event(move |event: &SseEvent| {
        *sink.lock().unwrap() = Some(event.parse_data());
    });

    client.connect();
    eventually(WAIT, || data.lock().unwrap().is_some(), "one event").await;

    assert_eq!(
        data.lock().unwrap().clone(),
        Some(SseData::Unparseable("refresh everything".to_string()))
    );
}

#[tokio::test]
async fn test_reconnect_resumes_from_id_only_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("last-event-id", "9"))
        .respond_with(event_stream("data: resumed\n\n"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(event_stream("id: 9\n\ndata: tick\n\n"))
        .mount(&server)
        .await;

    let policy = ReconnectPolicy {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(10),
        max_attempts: 1,
    };
    let client = SseClient::with_policy(format!("{}/events", server.uri()), policy);
    let data = Arc::new(Mutex::new(Vec::new()));
    let sink = data.clone();
    let _events = client.on_event(move |event: &SseEvent| {
        sink.lock().unwrap().push(event.data.clone());
    });

    client.connect();
    eventually(
        WAIT,
        || data.lock().unwrap().iter().any(|d| d == "resumed"),
        "resumed stream",
    )
    .await;
    client.disconnect();

    assert_eq!(data.lock().unwrap()[0], "tick");
    assert_eq!(client.last_event_id().as_deref(), Some("9"));
}
