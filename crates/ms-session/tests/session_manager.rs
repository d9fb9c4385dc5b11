//! Connectivity state transitions against a scripted backend.

use std::sync::Arc;

use ms_session::{
    ConnectionState, DeviceStatus, PollOutcome, SessionError, SessionManager, default_devices,
};
use ms_transport::{Endpoint, MockTransport, TransportError};
use serde_json::json;

fn session_with(mock: &Arc<MockTransport>) -> SessionManager {
    SessionManager::new(mock.clone(), default_devices()).expect("valid device set")
}

fn statuses(session: &SessionManager) -> Vec<DeviceStatus> {
    session.devices().iter().map(|d| d.status).collect()
}

#[tokio::test]
async fn connect_marks_every_device_connected() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({"success": true}));
    let session = session_with(&mock);

    session.connect().await.expect("connect succeeds");

    assert_eq!(session.connection(), ConnectionState::Connected);
    assert!(statuses(&session).iter().all(|s| *s == DeviceStatus::Connected));
}

#[tokio::test]
async fn connect_accepts_an_empty_body() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, serde_json::Value::Null);
    let session = session_with(&mock);

    session.connect().await.expect("empty 2xx is success");
    assert_eq!(session.connection(), ConnectionState::Connected);
}

#[tokio::test]
async fn failed_connect_leaves_device_statuses_alone() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Endpoint::OpcStatus,
        json!({"connected": true, "devices": [{"id": 2, "status": "error"}]}),
    );
    mock.fail(
        Endpoint::OpcConnect,
        TransportError::Status {
            endpoint: Endpoint::OpcConnect,
            status: 503,
            body: "busy".into(),
        },
    );
    let session = session_with(&mock);
    session.poll_status().await;
    let before = statuses(&session);

    let err = session.connect().await.expect_err("connect fails");

    assert!(matches!(err, SessionError::ConnectFailed(_)));
    assert_eq!(session.connection(), ConnectionState::Disconnected);
    assert_eq!(statuses(&session), before);
}

#[tokio::test]
async fn malformed_connect_body_is_a_failure() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(
        Endpoint::OpcConnect,
        TransportError::malformed(Endpoint::OpcConnect, "invalid JSON"),
    );
    let session = session_with(&mock);

    assert!(session.connect().await.is_err());
    assert_eq!(session.connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn disconnect_always_ends_disconnected() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({}));
    mock.fail(
        Endpoint::OpcDisconnect,
        TransportError::network(Endpoint::OpcDisconnect, "connection refused"),
    );
    let session = session_with(&mock);
    session.connect().await.unwrap();

    session.disconnect().await;

    assert_eq!(session.connection(), ConnectionState::Disconnected);
    assert!(statuses(&session).iter().all(|s| *s == DeviceStatus::Disconnected));
    assert_eq!(mock.call_count(Endpoint::OpcDisconnect), 1);
}

#[tokio::test]
async fn every_poll_failure_collapses_to_disconnected() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({}));
    mock.enqueue(
        Endpoint::OpcStatus,
        Err(TransportError::Timeout {
            endpoint: Endpoint::OpcStatus,
        }),
    )
    .enqueue(
        Endpoint::OpcStatus,
        Err(TransportError::malformed(Endpoint::OpcStatus, "bad")),
    )
    .enqueue(Endpoint::OpcStatus, Ok(json!({"devices": []})))
    .enqueue(
        Endpoint::OpcStatus,
        Err(TransportError::Status {
            endpoint: Endpoint::OpcStatus,
            status: 500,
            body: String::new(),
        }),
    );
    let session = session_with(&mock);

    for _ in 0..4 {
        session.connect().await.unwrap();
        let outcome = session.poll_status().await;
        assert!(outcome.is_failure(), "unexpected outcome {outcome:?}");
        assert_eq!(session.connection(), ConnectionState::Disconnected);
        assert!(statuses(&session).iter().all(|s| *s == DeviceStatus::Disconnected));
    }
}

#[tokio::test]
async fn explicit_disconnected_report_clears_devices() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({}));
    mock.respond(
        Endpoint::OpcStatus,
        json!({"connected": false, "devices": [{"id": 1, "status": "connected"}]}),
    );
    let session = session_with(&mock);
    session.connect().await.unwrap();

    assert_eq!(session.poll_status().await, PollOutcome::ReportedDisconnected);
    assert_eq!(session.connection(), ConnectionState::Disconnected);
    assert!(statuses(&session).iter().all(|s| *s == DeviceStatus::Disconnected));
}

#[tokio::test]
async fn connected_report_updates_only_listed_devices() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({}));
    mock.respond(
        Endpoint::OpcStatus,
        json!({
            "connected": true,
            "devices": [
                {"id": 2, "status": "error"},
                {"id": 99, "status": "disconnected"}
            ]
        }),
    );
    let session = session_with(&mock);
    session.connect().await.unwrap();

    assert_eq!(
        session.poll_status().await,
        PollOutcome::Connected { updated: 1 }
    );
    assert_eq!(session.connection(), ConnectionState::Connected);
    assert_eq!(
        statuses(&session),
        vec![
            DeviceStatus::Connected,
            DeviceStatus::Error,
            DeviceStatus::Connected,
            DeviceStatus::Connected,
        ]
    );
}

#[tokio::test]
async fn poll_recovers_after_outage() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(
        Endpoint::OpcStatus,
        Err(TransportError::network(Endpoint::OpcStatus, "down")),
    );
    mock.respond(
        Endpoint::OpcStatus,
        json!({"opcConnected": true, "machines": [{"id": 1, "status": "connected"}]}),
    );
    let session = session_with(&mock);

    assert!(session.poll_status().await.is_failure());
    assert!(!session.poll_status().await.is_failure());
    assert_eq!(session.connection(), ConnectionState::Connected);
    assert_eq!(statuses(&session)[0], DeviceStatus::Connected);
    assert_eq!(statuses(&session)[1], DeviceStatus::Disconnected);
}

#[tokio::test]
async fn subscribers_see_each_transition() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcConnect, json!({}));
    let session = session_with(&mock);
    let mut updates = session.subscribe();

    session.connect().await.unwrap();

    assert!(updates.has_changed().unwrap());
    let latest = updates.borrow_and_update().clone();
    assert_eq!(latest.connection, ConnectionState::Connected);
    assert_eq!(latest.connected_devices(), 4);
}
