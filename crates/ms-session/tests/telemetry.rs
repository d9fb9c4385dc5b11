use std::sync::Arc;

use chrono::{TimeZone, Utc};
use ms_core::Xorshift64;
use ms_session::{SessionManager, default_devices};
use ms_transport::{Endpoint, MockTransport};
use serde_json::json;

#[tokio::test]
async fn only_connected_devices_receive_readings() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Endpoint::OpcStatus,
        json!({"connected": true, "devices": [
            {"id": 1, "status": "connected"},
            {"id": 4, "status": "connected"}
        ]}),
    );
    let session = SessionManager::new(mock, default_devices()).unwrap();
    session.poll_status().await;

    let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
    let mut rng = Xorshift64::new(11);
    let zones = session
        .sample_telemetry(&mut rng, now)
        .expect("temperature controller is connected");

    assert!((1240.0..=1260.0).contains(&zones.zone1));
    assert!((1255.0..=1270.0).contains(&zones.zone2));
    assert!((1275.0..=1285.0).contains(&zones.zone3));

    let devices = session.devices();
    assert_eq!(devices[0].last_reading_at, Some(now));
    assert!(devices[1].reading.is_empty());
    assert!(devices[2].last_reading_at.is_none());
    assert_eq!(devices[3].reading.len(), 4);
}

#[test]
fn disconnected_session_produces_nothing() {
    let session = SessionManager::new(Arc::new(MockTransport::new()), default_devices()).unwrap();
    let mut rng = Xorshift64::new(1);
    assert!(session.sample_telemetry(&mut rng, Utc::now()).is_none());
    assert!(session.devices().iter().all(|d| d.reading.is_empty()));
}
