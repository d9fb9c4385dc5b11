//! Static (schema-independent) form fields.

use chrono::{DateTime, Utc};

pub const BATCH_ID: &str = "batch_id";
pub const TIMESTAMP: &str = "timestamp";
pub const CHARGE_WEIGHT_KG: &str = "charge_weight_kg";
pub const SCRAP_ADDED_KG: &str = "scrap_added_kg";
pub const ZONE1_TEMP: &str = "zone1_temp";
pub const ZONE2_TEMP: &str = "zone2_temp";
pub const ZONE3_TEMP: &str = "zone3_temp";
pub const STIRRER_RPM: &str = "stirrer_rpm";
pub const STIRRER_TIME: &str = "stirrer_time";
pub const STIRRER_TORQUE: &str = "stirrer_torque";
pub const GAS_FLOW: &str = "gas_flow";
pub const ENERGY_BASELINE_KWH: &str = "energy_baseline_kwh";

pub const DEFAULT_STIRRER_RPM: f64 = 150.0;
pub const DEFAULT_STIRRER_TIME: f64 = 30.0;

/// Static keys that look like schema-driven ones but never are.
pub const RESERVED_STATIC_KEYS: &[&str] = &[SCRAP_ADDED_KG];

/// Timestamps in the form carry minute precision.
pub fn format_minute(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M").to_string()
}

pub fn default_batch_id(at: DateTime<Utc>) -> String {
    format!("BATCH-{}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn minute_precision() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_minute(at), "2026-03-09T14:05");
    }

    #[test]
    fn batch_id_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(default_batch_id(at), "BATCH-1700000000123");
    }
}
