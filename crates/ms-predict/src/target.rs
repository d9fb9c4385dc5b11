//! Grade mean-composition lookup.

use std::collections::BTreeMap;

use ms_core::{ElementSymbol, Real};
use ms_transport::{Endpoint, Request, Transport};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

/// Target percentage per canonical element symbol.
pub type TargetComposition = BTreeMap<String, Real>;

#[derive(Deserialize)]
struct RangeBody {
    #[serde(rename = "compositionRange")]
    composition_range: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeEnvelope {
    Flat(RangeBody),
    Nested { data: RangeBody },
}

/// Mean of each `[min, max]` range. Malformed entries are skipped; an
/// unrecognized body yields an empty target.
pub fn decode_targets(body: Value) -> TargetComposition {
    let ranges = match serde_json::from_value::<RangeEnvelope>(body) {
        Ok(RangeEnvelope::Flat(body) | RangeEnvelope::Nested { data: body }) => {
            body.composition_range
        }
        Err(_) => return TargetComposition::new(),
    };
    ranges
        .iter()
        .filter_map(|(symbol, range)| {
            let element = ElementSymbol::parse(symbol)?;
            let [min, max] = range.as_array()?.as_slice() else {
                return None;
            };
            let (min, max) = (min.as_f64()?, max.as_f64()?);
            let mean = (min + max) / 2.0;
            mean.is_finite()
                .then(|| (element.as_str().to_string(), mean))
        })
        .collect()
}

/// Fetch the target composition of `grade` (`POST /grade-by-name`).
///
/// Any failure degrades to an empty target.
pub async fn fetch_targets(transport: &dyn Transport, grade: &str) -> TargetComposition {
    let grade = grade.trim();
    if grade.is_empty() {
        return TargetComposition::new();
    }
    let request = Request::new(Endpoint::GradeByName).with_body(json!({ "name": grade }));
    match transport.send(request).await {
        Ok(body) => {
            let targets = decode_targets(body);
            debug!(grade, elements = targets.len(), "grade targets resolved");
            targets
        }
        Err(error) => {
            warn!(%error, grade, "grade range lookup failed, sending empty target");
            TargetComposition::new()
        }
    }
}
