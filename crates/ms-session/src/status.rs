//! Decoding of the `/opc-status` body.

use ms_core::DeviceId;
use ms_transport::{Endpoint, TransportError, TransportResult};
use serde::Deserialize;
use serde_json::Value;

use crate::DeviceStatus;

/// Result of a single status poll, after it was applied to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The service could not be read; everything was marked disconnected.
    Unreachable(TransportError),
    /// The service reported `connected=false`.
    ReportedDisconnected,
    /// The service reported `connected=true`; `updated` devices matched by id.
    Connected { updated: usize },
}

impl PollOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PollOutcome::Unreachable(_))
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(alias = "opcConnected")]
    connected: bool,
    #[serde(default, alias = "machines")]
    devices: Option<Vec<StatusEntry>>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    id: u32,
    #[serde(default)]
    status: Option<String>,
}

/// Decoded status report.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StatusReport {
    pub connected: bool,
    pub devices: Vec<(DeviceId, DeviceStatus)>,
}

/// A body without a boolean `connected` flag is malformed. Device entries
/// with an invalid id or an unknown status are skipped.
pub(crate) fn decode_status(body: Value) -> TransportResult<StatusReport> {
    let body: StatusBody = serde_json::from_value(body)
        .map_err(|error| TransportError::malformed(Endpoint::OpcStatus, error.to_string()))?;
    let devices = body
        .devices
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let id = DeviceId::new(entry.id)?;
            let status = DeviceStatus::parse(entry.status.as_deref()?)?;
            Some((id, status))
        })
        .collect();
    Ok(StatusReport {
        connected: body.connected,
        devices,
    })
}
