//! Scripted in-memory transport.
//!
//! Responses are looked up per endpoint: queued one-shot responses first,
//! then the standing response. Unscripted endpoints fail with a network
//! error. Every request is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::{Endpoint, Request, Transport, TransportError, TransportFuture, TransportResult};

#[derive(Default)]
struct MockState {
    queued: HashMap<Endpoint, VecDeque<TransportResult<Value>>>,
    standing: HashMap<Endpoint, TransportResult<Value>>,
    calls: Vec<Request>,
}

#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every call to `endpoint` with `value`.
    pub fn respond(&self, endpoint: Endpoint, value: Value) -> &Self {
        self.lock().standing.insert(endpoint, Ok(value));
        self
    }

    /// Fail every call to `endpoint` with `error`.
    pub fn fail(&self, endpoint: Endpoint, error: TransportError) -> &Self {
        self.lock().standing.insert(endpoint, Err(error));
        self
    }

    /// Answer the next call to `endpoint` only.
    pub fn enqueue(&self, endpoint: Endpoint, result: TransportResult<Value>) -> &Self {
        self.lock()
            .queued
            .entry(endpoint)
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Request> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    fn answer(&self, request: Request) -> TransportResult<Value> {
        let mut state = self.lock();
        let endpoint = request.endpoint;
        state.calls.push(request);
        if let Some(result) = state.queued.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            return result;
        }
        state
            .standing
            .get(&endpoint)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::network(endpoint, "no scripted response")))
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> TransportFuture<'_, Value> {
        let result = self.answer(request);
        Box::pin(async move { result })
    }
}
