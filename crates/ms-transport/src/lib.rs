//! Transport client for the plant backend.
//!
//! Every remote call in the console goes through the [`Transport`] trait:
//! connectivity commands, grade lookups, synthetic readings and the
//! optimizer. Bodies are JSON in both directions. Failures are classified
//! into a [`TransportError`] so callers can apply their own policy (the
//! session manager collapses all of them to "disconnected", the optimizer
//! falls back to a cached recommendation).

pub mod endpoint;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

pub use endpoint::{Endpoint, Method};
pub use error::{TransportError, TransportResult};
pub use http::{HttpConfig, HttpTransport};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A single request against one of the backend endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    /// Per-request timeout. `None` uses the transport default.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Issues requests to the configured backend.
///
/// A successful call yields the decoded JSON body, or `Value::Null` when the
/// body was empty. Non-2xx responses are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> TransportFuture<'_, Value>;
}
