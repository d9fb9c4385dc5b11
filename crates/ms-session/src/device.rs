//! Plant devices attached to the connectivity service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ms_core::DeviceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Temperature,
    Stirrer,
    MaterialFeed,
    Analyzer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Connected,
    #[default]
    Disconnected,
    Error,
}

impl DeviceStatus {
    /// Parse the wire form. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "connected" => Some(Self::Connected),
            "disconnected" => Some(Self::Disconnected),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// One configured device.
///
/// The device set is fixed when the session starts; only `status`,
/// `last_reading_at` and `reading` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub display_name: String,
    pub kind: DeviceKind,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub last_reading_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reading: BTreeMap<String, f64>,
}

impl DeviceRecord {
    pub fn new(id: DeviceId, display_name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind,
            status: DeviceStatus::Disconnected,
            last_reading_at: None,
            reading: BTreeMap::new(),
        }
    }
}

/// The four devices of a standard furnace line.
pub fn default_devices() -> Vec<DeviceRecord> {
    [
        (1, "Furnace Zone Controller", DeviceKind::Temperature),
        (2, "Stirrer Control Unit", DeviceKind::Stirrer),
        (3, "Material Feed System", DeviceKind::MaterialFeed),
        (4, "Composition Analyzer", DeviceKind::Analyzer),
    ]
    .into_iter()
    .filter_map(|(id, name, kind)| DeviceId::new(id).map(|id| DeviceRecord::new(id, name, kind)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_devices_start_disconnected() {
        let devices = default_devices();
        assert_eq!(devices.len(), 4);
        assert!(devices.iter().all(|d| d.status == DeviceStatus::Disconnected));
        let ids: Vec<u32> = devices.iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(DeviceStatus::parse("Connected"), Some(DeviceStatus::Connected));
        assert_eq!(DeviceStatus::parse(" error "), Some(DeviceStatus::Error));
        assert_eq!(DeviceStatus::parse("flaky"), None);
    }
}
