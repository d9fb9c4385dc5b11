//! Connectivity session manager.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ms_transport::{Endpoint, Request, Transport};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::status::{StatusReport, decode_status};
use crate::{
    CancelFlag, ConnectionState, DeviceRecord, DeviceStatus, PollConfig, PollHandle, PollOutcome,
    SessionError, SessionResult, SessionSnapshot,
};

struct SessionState {
    connection: ConnectionState,
    devices: Vec<DeviceRecord>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.connection,
            devices: self.devices.clone(),
        }
    }

    fn set_all(&mut self, status: DeviceStatus) {
        for device in &mut self.devices {
            device.status = status;
        }
    }

    fn mark_disconnected(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.set_all(DeviceStatus::Disconnected);
    }
}

/// Single writer of the connection state and device statuses.
///
/// Cloning is cheap and yields a handle onto the same session; the poll
/// loop runs on such a clone.
#[derive(Clone)]
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<SessionState>>,
    updates: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionManager {
    /// Create a session over a fixed device set, initially disconnected.
    pub fn new(transport: Arc<dyn Transport>, devices: Vec<DeviceRecord>) -> SessionResult<Self> {
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.id) {
                return Err(SessionError::DuplicateDevice {
                    id: device.id.get(),
                });
            }
        }

        let mut state = SessionState {
            connection: ConnectionState::Disconnected,
            devices,
        };
        state.set_all(DeviceStatus::Disconnected);
        let (updates, _) = watch::channel(state.snapshot());
        Ok(Self {
            transport,
            state: Arc::new(Mutex::new(state)),
            updates: Arc::new(updates),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `update` and publish the resulting snapshot.
    fn mutate<R>(&self, update: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock();
        let result = update(&mut state);
        self.updates.send_replace(state.snapshot());
        result
    }

    pub fn connection(&self) -> ConnectionState {
        self.lock().connection
    }

    pub fn devices(&self) -> Vec<DeviceRecord> {
        self.lock().devices.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Establish the remote session.
    ///
    /// On success every device becomes connected in one step. On failure the
    /// session returns to disconnected and device statuses are untouched.
    pub async fn connect(&self) -> SessionResult<()> {
        self.mutate(|state| state.connection = ConnectionState::Connecting);
        info!("connecting to OPC service");

        match self.transport.send(Request::new(Endpoint::OpcConnect)).await {
            Ok(_) => {
                self.mutate(|state| {
                    state.connection = ConnectionState::Connected;
                    state.set_all(DeviceStatus::Connected);
                });
                info!("OPC session established");
                Ok(())
            }
            Err(error) => {
                self.mutate(|state| state.connection = ConnectionState::Disconnected);
                warn!(%error, "OPC connect failed");
                Err(SessionError::ConnectFailed(error))
            }
        }
    }

    /// Tear down the remote session. The remote answer is ignored; locally
    /// the session always ends disconnected.
    pub async fn disconnect(&self) {
        if let Err(error) = self
            .transport
            .send(Request::new(Endpoint::OpcDisconnect))
            .await
        {
            debug!(%error, "OPC disconnect call failed, ignoring");
        }
        self.mutate(SessionState::mark_disconnected);
        info!("OPC session closed");
    }

    /// Query the service once and apply the answer.
    pub async fn poll_status(&self) -> PollOutcome {
        let report = self.fetch_status().await;
        self.mutate(|state| apply_status(state, report))
    }

    /// Like [`poll_status`](Self::poll_status) but discards the answer when
    /// `cancel` was raised while the query was in flight.
    pub(crate) async fn poll_status_guarded(&self, cancel: &CancelFlag) -> Option<PollOutcome> {
        let report = self.fetch_status().await;
        let mut state = self.lock();
        if cancel.is_cancelled() {
            debug!("discarding status answer received after cancellation");
            return None;
        }
        let outcome = apply_status(&mut state, report);
        self.updates.send_replace(state.snapshot());
        Some(outcome)
    }

    async fn fetch_status(&self) -> ms_transport::TransportResult<StatusReport> {
        let body = self
            .transport
            .send(Request::new(Endpoint::OpcStatus))
            .await?;
        decode_status(body)
    }

    /// Start the background status loop on the current tokio runtime.
    pub fn spawn_polling(&self, config: PollConfig) -> PollHandle {
        PollHandle::spawn(self.clone(), config)
    }

    pub(crate) fn with_devices_mut<R>(&self, update: impl FnOnce(&mut [DeviceRecord]) -> R) -> R {
        self.mutate(|state| update(&mut state.devices))
    }
}

fn apply_status(
    state: &mut SessionState,
    report: ms_transport::TransportResult<StatusReport>,
) -> PollOutcome {
    match report {
        Err(error) => {
            if state.connection != ConnectionState::Disconnected {
                warn!(%error, "status poll failed, marking session disconnected");
            } else {
                debug!(%error, "status poll failed");
            }
            state.mark_disconnected();
            PollOutcome::Unreachable(error)
        }
        Ok(report) if !report.connected => {
            state.mark_disconnected();
            PollOutcome::ReportedDisconnected
        }
        Ok(report) => {
            state.connection = ConnectionState::Connected;
            let mut updated = 0;
            for (id, status) in report.devices {
                if let Some(device) = state.devices.iter_mut().find(|d| d.id == id) {
                    device.status = status;
                    updated += 1;
                }
            }
            PollOutcome::Connected { updated }
        }
    }
}
