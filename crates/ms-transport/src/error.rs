use thiserror::Error;

use crate::Endpoint;

pub type TransportResult<T> = Result<T, TransportError>;

/// Classified transport failure.
///
/// Every variant means "the service did not give us a usable answer".
/// Consumers that need finer policy match on the variant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("{endpoint} request failed: {message}")]
    Network { endpoint: Endpoint, message: String },

    #[error("{endpoint} timed out")]
    Timeout { endpoint: Endpoint },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("{endpoint} returned a malformed body: {message}")]
    Malformed { endpoint: Endpoint, message: String },

    #[error("{endpoint} response too large: {size} exceeds {limit} bytes")]
    TooLarge {
        endpoint: Endpoint,
        size: u64,
        limit: usize,
    },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    pub fn malformed(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint,
            message: message.into(),
        }
    }

    pub fn network(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
