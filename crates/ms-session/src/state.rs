use serde::{Deserialize, Serialize};

use crate::DeviceRecord;

/// Connection to the remote device-connectivity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

/// Read-only copy of the session handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub devices: Vec<DeviceRecord>,
}

impl SessionSnapshot {
    pub fn connected_devices(&self) -> usize {
        self.devices.iter().filter(|d| d.status.is_connected()).count()
    }
}
