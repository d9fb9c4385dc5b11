//! Optimizer call with session fallback.

use std::sync::Arc;
use std::time::Duration;

use ms_form::FormModel;
use ms_session::ConnectionState;
use ms_transport::{Endpoint, Request, Transport, TransportError};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{FallbackCache, OptimizeRequest, fetch_targets};

pub const DEFAULT_OPTIMIZER_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    InFlight,
}

/// One prediction, live or synthetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Optimizer response verbatim, or the cached fallback body.
    pub body: Value,
    pub synthetic: bool,
    /// Failure that triggered the fallback.
    pub error: Option<String>,
    /// The fallback was triggered by the optimizer timing out.
    pub timed_out: bool,
    pub request: OptimizeRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotConnected(ConnectionState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// Preconditions not met; no request was made.
    Skipped(SkipReason),
    Live(PredictionResult),
    /// The optimizer was unavailable; the session fallback was used.
    Fallback(PredictionResult),
}

impl PredictionOutcome {
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Skipped(_) => None,
            PredictionOutcome::Live(result) | PredictionOutcome::Fallback(result) => Some(result),
        }
    }
}

pub struct PredictionOrchestrator {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    fallback: FallbackCache,
    state: OrchestratorState,
    latest: Option<PredictionResult>,
}

impl PredictionOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, fallback_seed: u64) -> Self {
        Self {
            transport,
            timeout: DEFAULT_OPTIMIZER_TIMEOUT,
            fallback: FallbackCache::new(fallback_seed),
            state: OrchestratorState::Idle,
            latest: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn latest(&self) -> Option<&PredictionResult> {
        self.latest.as_ref()
    }

    pub fn fallback(&self) -> &FallbackCache {
        &self.fallback
    }

    /// Request a recommendation for the current form.
    ///
    /// Requires a connected session. An optimizer failure of any kind yields
    /// the session fallback, tagged synthetic.
    pub async fn generate(
        &mut self,
        connection: ConnectionState,
        form: &FormModel,
        grade: &str,
        now_minute: &str,
    ) -> PredictionOutcome {
        if !connection.is_connected() {
            warn!(connection = connection.label(), "prediction skipped, session not connected");
            return PredictionOutcome::Skipped(SkipReason::NotConnected(connection));
        }

        self.state = OrchestratorState::InFlight;
        let targets = fetch_targets(self.transport.as_ref(), grade).await;
        let request = OptimizeRequest::from_form(form, grade, targets, now_minute);
        let response = self.call_optimizer(&request).await;
        self.state = OrchestratorState::Idle;

        let outcome = match response {
            Ok(body) => {
                info!(batch_id = request.batch_id, "optimizer recommendation received");
                PredictionOutcome::Live(PredictionResult {
                    body,
                    synthetic: false,
                    error: None,
                    timed_out: false,
                    request,
                })
            }
            Err(error) => {
                warn!(%error, batch_id = request.batch_id, "optimizer unavailable, using fallback");
                PredictionOutcome::Fallback(PredictionResult {
                    body: self.fallback.get_or_synthesize().clone(),
                    synthetic: true,
                    error: Some(error.to_string()),
                    timed_out: error.is_timeout(),
                    request,
                })
            }
        };
        self.latest = outcome.result().cloned();
        outcome
    }

    async fn call_optimizer(&self, request: &OptimizeRequest) -> Result<Value, TransportError> {
        let body = serde_json::to_value(request)
            .map_err(|e| TransportError::Client(format!("encode optimize request: {e}")))?;
        let send = self.transport.send(
            Request::new(Endpoint::Optimize)
                .with_body(body)
                .with_timeout(self.timeout),
        );
        // Bounded even when the transport ignores the per-request timeout.
        match tokio::time::timeout(self.timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                endpoint: Endpoint::Optimize,
            }),
        }
    }
}
