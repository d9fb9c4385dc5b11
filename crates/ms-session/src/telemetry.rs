//! Simulated device telemetry.
//!
//! Stands in for live instrument values: every connected device receives a
//! kind-specific reading and a fresh `last_reading_at`. Disconnected devices
//! keep their last reading.

use chrono::{DateTime, Utc};
use ms_core::{Xorshift64, round_to};

use crate::{DeviceKind, SessionManager};

/// Furnace zone temperatures in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneTemperatures {
    pub zone1: f64,
    pub zone2: f64,
    pub zone3: f64,
}

fn sample(kind: DeviceKind, rng: &mut Xorshift64) -> Vec<(&'static str, f64)> {
    let mut value = |lo: f64, hi: f64| round_to(rng.range(lo, hi), 2);
    match kind {
        DeviceKind::Temperature => vec![
            ("zone1", value(1240.0, 1260.0)),
            ("zone2", value(1255.0, 1270.0)),
            ("zone3", value(1275.0, 1285.0)),
        ],
        DeviceKind::Stirrer => vec![("rpm", value(145.0, 155.0)), ("time", value(28.0, 32.0))],
        DeviceKind::MaterialFeed => vec![
            ("al", value(0.0, 100.0)),
            ("cu", value(0.0, 50.0)),
            ("si", value(0.0, 30.0)),
        ],
        DeviceKind::Analyzer => vec![
            ("al_pct", value(85.0, 95.0)),
            ("cu_pct", value(8.0, 12.0)),
            ("si_pct", value(5.0, 7.0)),
            ("fe_pct", value(2.0, 3.0)),
        ],
    }
}

impl SessionManager {
    /// Refresh readings of all connected devices.
    ///
    /// Returns the zone temperatures when a connected temperature controller
    /// produced them.
    pub fn sample_telemetry(
        &self,
        rng: &mut Xorshift64,
        now: DateTime<Utc>,
    ) -> Option<ZoneTemperatures> {
        self.with_devices_mut(|devices| {
            let mut zones = None;
            for device in devices.iter_mut().filter(|d| d.status.is_connected()) {
                let values = sample(device.kind, rng);
                device.reading = values.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                device.last_reading_at = Some(now);
                if device.kind == DeviceKind::Temperature {
                    let get = |key: &str| device.reading.get(key).copied().unwrap_or_default();
                    zones = Some(ZoneTemperatures {
                        zone1: get("zone1"),
                        zone2: get("zone2"),
                        zone3: get("zone3"),
                    });
                }
            }
            zones
        })
    }
}
