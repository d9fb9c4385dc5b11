//! Timing and cancellation of the status loop, on paused virtual time.

use std::sync::Arc;
use std::time::Duration;

use ms_session::{ConnectionState, PollConfig, SessionManager, default_devices};
use ms_transport::{
    Endpoint, MockTransport, Request, Transport, TransportError, TransportFuture,
};
use serde_json::{Value, json};
use tokio::sync::Semaphore;

#[tokio::test(start_paused = true)]
async fn polls_immediately_then_after_each_interval() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcStatus, json!({"connected": true}));
    let session = SessionManager::new(mock.clone(), default_devices()).unwrap();

    let handle = session.spawn_polling(PollConfig::new(Duration::from_millis(2000)));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(mock.call_count(Endpoint::OpcStatus), 1);
    assert_eq!(session.connection(), ConnectionState::Connected);

    tokio::time::sleep(Duration::from_millis(4490)).await;
    assert_eq!(mock.call_count(Endpoint::OpcStatus), 3);
    assert_eq!(handle.stats().polls(), 3);

    handle.cancel();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(mock.call_count(Endpoint::OpcStatus), 3);
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_loop() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(
        Endpoint::OpcStatus,
        TransportError::network(Endpoint::OpcStatus, "refused"),
    );
    let session = SessionManager::new(mock.clone(), default_devices()).unwrap();

    let handle = session.spawn_polling(PollConfig::default());
    tokio::time::sleep(Duration::from_millis(6100)).await;

    assert_eq!(handle.stats().polls(), 4);
    assert_eq!(handle.stats().failures(), 4);
    assert_eq!(session.connection(), ConnectionState::Disconnected);
}

/// Holds every status call until a permit is released.
struct GatedTransport {
    gate: Arc<Semaphore>,
}

impl Transport for GatedTransport {
    fn send(&self, request: Request) -> TransportFuture<'_, Value> {
        Box::pin(async move {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| TransportError::network(request.endpoint, "gate closed"))?;
            Ok(json!({"connected": true, "devices": [{"id": 1, "status": "connected"}]}))
        })
    }
}

#[tokio::test(start_paused = true)]
async fn answer_arriving_after_cancel_is_not_applied() {
    let gate = Arc::new(Semaphore::new(0));
    let transport = Arc::new(GatedTransport { gate: gate.clone() });
    let session = SessionManager::new(transport, default_devices()).unwrap();

    let handle = session.spawn_polling(PollConfig::default());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();
    gate.add_permits(10);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(handle.stats().polls(), 0);
    assert_eq!(session.connection(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn slow_polls_never_overlap() {
    let gate = Arc::new(Semaphore::new(0));
    let transport = Arc::new(GatedTransport { gate: gate.clone() });
    let session = SessionManager::new(transport, default_devices()).unwrap();

    let handle = session.spawn_polling(PollConfig::default());
    // The first poll is stuck far beyond several intervals.
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(handle.stats().polls(), 0);

    gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.stats().polls(), 1);
    assert_eq!(session.connection(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Endpoint::OpcStatus, json!({"connected": false}));
    let session = SessionManager::new(mock.clone(), default_devices()).unwrap();

    {
        let _handle = session.spawn_polling(PollConfig::default());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(mock.call_count(Endpoint::OpcStatus), 1);
}
