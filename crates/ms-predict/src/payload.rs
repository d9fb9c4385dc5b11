//! Optimizer request payload.
//!
//! The optimizer rejects out-of-range inputs, so a few fields are clamped
//! here. Missing or non-numeric form values read as zero before clamping.

use std::collections::BTreeMap;

use ms_core::{Real, clamp_non_negative, floor_at};
use ms_form::fields::{
    BATCH_ID, CHARGE_WEIGHT_KG, ENERGY_BASELINE_KWH, GAS_FLOW, SCRAP_ADDED_KG, STIRRER_RPM,
    STIRRER_TIME, STIRRER_TORQUE, TIMESTAMP, ZONE1_TEMP, ZONE2_TEMP, ZONE3_TEMP,
};
use ms_form::{ElementFamily, FormModel};
use serde::{Deserialize, Serialize};

use crate::TargetComposition;

pub const MAX_BATCH_ID: u32 = i32::MAX as u32;
pub const MIN_STIRRER_TORQUE_NM: Real = 10.0;
pub const MAX_STIRRER_DURATION_MIN: Real = 60.0;
pub const MAX_CHARGE_WEIGHT_KG: Real = 10_000.0;
pub const MIN_ENERGY_BASELINE_KWH: Real = 100.0;

/// Trailing digits kept from a long textual id. Nine digits always fit
/// under [`MAX_BATCH_ID`].
const BATCH_ID_DIGITS: usize = 9;

/// Numeric batch id: the trailing digits of the textual id, clamped.
pub fn clamp_batch_id(raw: &str) -> u32 {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    let tail: String = digits[digits.len().saturating_sub(BATCH_ID_DIGITS)..]
        .iter()
        .collect();
    tail.parse::<u64>()
        .map_or(MAX_BATCH_ID, |v| v.min(u64::from(MAX_BATCH_ID)) as u32)
}

pub fn clamp_torque(v: Real) -> Real {
    floor_at(v, MIN_STIRRER_TORQUE_NM)
}

pub fn clamp_duration(v: Real) -> Real {
    clamp_non_negative(v, MAX_STIRRER_DURATION_MIN)
}

pub fn clamp_charge_weight(v: Real) -> Real {
    clamp_non_negative(v, MAX_CHARGE_WEIGHT_KG)
}

pub fn clamp_energy_baseline(v: Real) -> Real {
    floor_at(v, MIN_ENERGY_BASELINE_KWH)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spectrometer {
    pub composition: BTreeMap<String, Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnaceTemp {
    pub zone1: Real,
    pub zone2: Real,
    pub zone3: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dosing {
    pub scrap_added_kg: Real,
    pub scrap_composition: BTreeMap<String, Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stirrer {
    pub rpm: Real,
    pub duration_min: Real,
    pub torque_nm: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCell {
    pub charge_weight_kg: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub energy_baseline_kwh: Real,
}

/// Body of `POST /optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub timestamp: String,
    pub batch_id: u32,
    pub alloy_type: String,
    pub spectrometer: Spectrometer,
    pub furnace_temp: FurnaceTemp,
    pub dosing: Dosing,
    pub stirrer: Stirrer,
    pub load_cell: LoadCell,
    pub gas_flow: Real,
    pub target_composition: TargetComposition,
    pub historical_data: HistoricalData,
}

impl OptimizeRequest {
    /// Build the clamped payload from the current form.
    ///
    /// `fallback_timestamp` is used when the form has no timestamp.
    pub fn from_form(
        form: &FormModel,
        grade: &str,
        target_composition: TargetComposition,
        fallback_timestamp: &str,
    ) -> Self {
        let timestamp = match form.text(TIMESTAMP).trim() {
            "" => fallback_timestamp.to_string(),
            stamp => stamp.to_string(),
        };
        Self {
            timestamp,
            batch_id: clamp_batch_id(&form.text(BATCH_ID)),
            alloy_type: grade.trim().to_string(),
            spectrometer: Spectrometer {
                composition: family_numbers(form, ElementFamily::Raw),
            },
            furnace_temp: FurnaceTemp {
                zone1: form.number(ZONE1_TEMP),
                zone2: form.number(ZONE2_TEMP),
                zone3: form.number(ZONE3_TEMP),
            },
            dosing: Dosing {
                scrap_added_kg: clamp_non_negative(form.number(SCRAP_ADDED_KG), Real::MAX),
                scrap_composition: family_numbers(form, ElementFamily::Scrap),
            },
            stirrer: Stirrer {
                rpm: form.number(STIRRER_RPM),
                duration_min: clamp_duration(form.number(STIRRER_TIME)),
                torque_nm: clamp_torque(form.number(STIRRER_TORQUE)),
            },
            load_cell: LoadCell {
                charge_weight_kg: clamp_charge_weight(form.number(CHARGE_WEIGHT_KG)),
            },
            gas_flow: form.number(GAS_FLOW),
            target_composition,
            historical_data: HistoricalData {
                energy_baseline_kwh: clamp_energy_baseline(form.number(ENERGY_BASELINE_KWH)),
            },
        }
    }
}

/// Filled values of one element family, keyed by canonical symbol.
fn family_numbers(form: &FormModel, family: ElementFamily) -> BTreeMap<String, Real> {
    form.family_values(family)
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(element, value)| (element.as_str().to_string(), value.as_number()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ms_core::ElementSymbol;
    use proptest::prelude::*;

    #[test]
    fn batch_id_digits() {
        assert_eq!(clamp_batch_id("BATCH-1234"), 1234);
        assert_eq!(clamp_batch_id("BATCH-1700000000123"), 123);
        assert_eq!(clamp_batch_id("BATCH-1700000456789"), 456_789);
        assert_eq!(clamp_batch_id("B-99999999999999999999999"), 999_999_999);
        assert_eq!(clamp_batch_id("none"), 0);
        assert_eq!(clamp_batch_id(""), 0);
    }

    #[test]
    fn default_batch_ids_stay_distinct() {
        let at = chrono::DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let later = at + chrono::Duration::seconds(1);
        let first = clamp_batch_id(&ms_form::fields::default_batch_id(at));
        let second = clamp_batch_id(&ms_form::fields::default_batch_id(later));
        assert_ne!(first, second);
        assert!(first < MAX_BATCH_ID && second < MAX_BATCH_ID);
    }

    #[test]
    fn empty_form_gets_floor_values() {
        let form = FormModel::empty();
        let req = OptimizeRequest::from_form(&form, "A", TargetComposition::new(), "2026-10-16T09:15");
        assert_eq!(req.timestamp, "2026-10-16T09:15");
        assert_eq!(req.stirrer.torque_nm, MIN_STIRRER_TORQUE_NM);
        assert_eq!(req.historical_data.energy_baseline_kwh, MIN_ENERGY_BASELINE_KWH);
        assert_eq!(req.stirrer.duration_min, 0.0);
        assert_eq!(req.load_cell.charge_weight_kg, 0.0);
    }

    #[test]
    fn oversized_inputs_are_capped() {
        let mut form = FormModel::new(Utc::now());
        form.set(STIRRER_TIME, "999");
        form.set(CHARGE_WEIGHT_KG, 25_000.0);
        form.set(STIRRER_TORQUE, "-4");
        let req = OptimizeRequest::from_form(&form, "A", TargetComposition::new(), "");
        assert_eq!(req.stirrer.duration_min, MAX_STIRRER_DURATION_MIN);
        assert_eq!(req.load_cell.charge_weight_kg, MAX_CHARGE_WEIGHT_KG);
        assert_eq!(req.stirrer.torque_nm, MIN_STIRRER_TORQUE_NM);
        assert_eq!(req.stirrer.rpm, 150.0);
    }

    #[test]
    fn compositions_skip_blank_fields() {
        let mut form = FormModel::empty();
        let elements: Vec<_> = ["Fe", "C"].iter().filter_map(|s| ElementSymbol::parse(s)).collect();
        form.apply_schema(&elements);
        form.set("fe_raw", "93.5");
        form.set("scrap_c", 3.0);
        let req = OptimizeRequest::from_form(&form, " A ", TargetComposition::new(), "");
        assert_eq!(req.alloy_type, "A");
        assert_eq!(req.spectrometer.composition.len(), 1);
        assert_eq!(req.spectrometer.composition["Fe"], 93.5);
        assert_eq!(req.dosing.scrap_composition["C"], 3.0);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let req = OptimizeRequest::from_form(&FormModel::empty(), "A", TargetComposition::new(), "t");
        let json = serde_json::to_value(&req).unwrap();
        for key in [
            "timestamp",
            "batchId",
            "alloyType",
            "spectrometer",
            "furnaceTemp",
            "dosing",
            "stirrer",
            "loadCell",
            "gasFlow",
            "targetComposition",
            "historicalData",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["stirrer"].get("durationMin").is_some());
    }

    proptest! {
        #[test]
        fn clamps_hold_for_any_input(raw in ".{0,12}", v in proptest::num::f64::ANY) {
            let mut form = FormModel::empty();
            form.set(STIRRER_TIME, raw.as_str());
            form.set(STIRRER_TORQUE, v);
            form.set(CHARGE_WEIGHT_KG, v);
            form.set(ENERGY_BASELINE_KWH, raw.as_str());
            form.set(BATCH_ID, raw.as_str());
            let req = OptimizeRequest::from_form(&form, "A", TargetComposition::new(), "t");

            prop_assert!((0.0..=MAX_STIRRER_DURATION_MIN).contains(&req.stirrer.duration_min));
            prop_assert!(req.stirrer.torque_nm >= MIN_STIRRER_TORQUE_NM);
            prop_assert!((0.0..=MAX_CHARGE_WEIGHT_KG).contains(&req.load_cell.charge_weight_kg));
            prop_assert!(req.historical_data.energy_baseline_kwh >= MIN_ENERGY_BASELINE_KWH);
            prop_assert!(req.batch_id <= MAX_BATCH_ID);
        }
    }
}
