//! Pluggable sources of synthetic composition data.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use ms_core::{Xorshift64, round_to};
use ms_transport::{Endpoint, Request, Transport, TransportError, TransportFuture};
use serde::Deserialize;
use serde_json::{Value, json};

/// One synthetic reading as delivered by a source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyntheticReading {
    /// Element symbol (as sent) to value. Non-numeric entries are dropped.
    #[serde(deserialize_with = "numeric_entries")]
    pub composition: BTreeMap<String, f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    /// RFC 3339 timestamp, when the source provides one.
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn numeric_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(element, value)| {
            let number = match &value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }?;
            number.is_finite().then_some((element, number))
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReadingEnvelope {
    Flat(SyntheticReading),
    Nested { data: SyntheticReading },
}

impl SyntheticReading {
    /// Decode `{composition, ...}`, optionally wrapped in `data`.
    pub fn from_body(body: Value) -> Option<Self> {
        match serde_json::from_value(body).ok()? {
            ReadingEnvelope::Flat(reading) | ReadingEnvelope::Nested { data: reading } => {
                Some(reading)
            }
        }
    }
}

/// Produces synthetic readings for a grade.
pub trait SyntheticSource: Send + Sync {
    fn fetch<'a>(&'a self, grade: &'a str) -> TransportFuture<'a, SyntheticReading>;
}

/// Asks the backend (`POST /synthetic-reading`).
pub struct RemoteSyntheticSource {
    transport: Arc<dyn Transport>,
}

impl RemoteSyntheticSource {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl SyntheticSource for RemoteSyntheticSource {
    fn fetch<'a>(&'a self, grade: &'a str) -> TransportFuture<'a, SyntheticReading> {
        Box::pin(async move {
            let request = Request::new(Endpoint::SyntheticReading)
                .with_body(json!({ "gradeName": grade }));
            let body = self.transport.send(request).await?;
            SyntheticReading::from_body(body).ok_or_else(|| {
                TransportError::malformed(Endpoint::SyntheticReading, "no composition in response")
            })
        })
    }
}

/// Element catalogue of the seeded source: symbol and value range in %.
pub const SEEDED_CATALOG: &[(&str, f64, f64)] = &[
    ("Fe", 90.0, 96.0),
    ("C", 2.5, 3.8),
    ("Si", 1.5, 2.8),
    ("Mn", 0.1, 0.6),
    ("Cu", 0.1, 0.5),
    ("Ni", 0.0, 0.3),
    ("Cr", 0.0, 0.2),
    ("Mo", 0.0, 0.1),
    ("Mg", 0.02, 0.06),
    ("Al", 0.0, 0.1),
];

const SEEDED_TEMPERATURE: (f64, f64) = (1240.0, 1285.0);

/// Local deterministic source. Offline and reproducible for a given seed.
///
/// Emits the whole catalogue for every grade; elements outside the active
/// schema are dropped by the generator.
pub struct SeededSyntheticSource {
    rng: Mutex<Xorshift64>,
}

impl SeededSyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Xorshift64::new(seed)),
        }
    }

    fn sample(&self) -> SyntheticReading {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let composition = SEEDED_CATALOG
            .iter()
            .map(|&(symbol, lo, hi)| (symbol.to_string(), round_to(rng.range(lo, hi), 3)))
            .collect();
        let temperature = Some(round_to(
            rng.range(SEEDED_TEMPERATURE.0, SEEDED_TEMPERATURE.1),
            1,
        ));
        SyntheticReading {
            composition,
            temperature,
            timestamp: None,
        }
    }
}

impl SyntheticSource for SeededSyntheticSource {
    fn fetch<'a>(&'a self, _grade: &'a str) -> TransportFuture<'a, SyntheticReading> {
        let reading = self.sample();
        Box::pin(async move { Ok(reading) })
    }
}
