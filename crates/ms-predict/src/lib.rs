//! Prediction orchestration.
//!
//! Builds the optimizer request from the batch form, calls the external
//! optimizer with a bounded timeout and substitutes a per-session cached
//! recommendation when the optimizer is unavailable. Nothing in this crate
//! returns an error to the caller; every call ends in a
//! [`PredictionOutcome`].

pub mod fallback;
pub mod orchestrator;
pub mod payload;
pub mod target;

pub use fallback::FallbackCache;
pub use orchestrator::{
    DEFAULT_OPTIMIZER_TIMEOUT, OrchestratorState, PredictionOrchestrator, PredictionOutcome,
    PredictionResult, SkipReason,
};
pub use payload::OptimizeRequest;
pub use target::{TargetComposition, decode_targets, fetch_targets};
