//! `reqwest`-backed transport.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::{Endpoint, Method, Request, Transport, TransportError, TransportFuture, TransportResult};

/// Default cap on response bodies.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Longest slice of an error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    /// Applied to every request that does not carry its own timeout.
    pub default_timeout: Option<Duration>,
    pub max_response_bytes: usize,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_timeout: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> TransportResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.default_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|error| TransportError::Client(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { http, config })
    }

    async fn execute(&self, request: Request) -> TransportResult<Value> {
        let endpoint = request.endpoint;
        let url = endpoint.url(&self.config.base_url);
        debug!(%endpoint, %url, "sending request");

        let mut builder = match endpoint.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let mut response = builder
            .send()
            .await
            .map_err(|error| classify(endpoint, &error))?;
        let status = response.status();
        let bytes = read_body_with_limit(
            &mut response,
            endpoint,
            self.config.max_response_bytes,
        )
        .await?;

        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        decode_body(endpoint, &bytes)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> TransportFuture<'_, Value> {
        Box::pin(self.execute(request))
    }
}

fn classify(endpoint: Endpoint, error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout { endpoint }
    } else {
        TransportError::network(endpoint, error.to_string())
    }
}

async fn read_body_with_limit(
    response: &mut reqwest::Response,
    endpoint: Endpoint,
    limit: usize,
) -> TransportResult<Vec<u8>> {
    if let Some(length) = response.content_length()
        && length > limit as u64
    {
        return Err(TransportError::TooLarge {
            endpoint,
            size: length,
            limit,
        });
    }
    let mut buffer = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|error| classify(endpoint, &error))?
    {
        append_limited_chunk(&mut buffer, &chunk, endpoint, limit)?;
    }
    Ok(buffer)
}

fn append_limited_chunk(
    buffer: &mut Vec<u8>,
    chunk: &[u8],
    endpoint: Endpoint,
    limit: usize,
) -> TransportResult<()> {
    let new_len = buffer.len().saturating_add(chunk.len());
    if new_len > limit {
        return Err(TransportError::TooLarge {
            endpoint,
            size: new_len as u64,
            limit,
        });
    }
    buffer.extend_from_slice(chunk);
    Ok(())
}

/// Empty bodies decode to `Null`; anything else must be JSON.
fn decode_body(endpoint: Endpoint, bytes: &[u8]) -> TransportResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|error| TransportError::malformed(endpoint, format!("invalid JSON: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_decodes_to_null() {
        assert_eq!(decode_body(Endpoint::OpcConnect, b"").unwrap(), Value::Null);
        assert_eq!(decode_body(Endpoint::OpcConnect, b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode_body(Endpoint::OpcStatus, b"<html>").unwrap_err();
        assert!(matches!(err, TransportError::Malformed { .. }));
    }

    #[test]
    fn json_body_is_decoded() {
        let value = decode_body(Endpoint::OpcStatus, br#"{"connected":true}"#).unwrap();
        assert_eq!(value, json!({"connected": true}));
    }

    #[test]
    fn append_limited_chunk_rejects_oversized_payload() {
        let mut buffer = vec![1, 2, 3];
        let err = append_limited_chunk(&mut buffer, &[4, 5, 6], Endpoint::GradeNames, 5)
            .expect_err("growth beyond limit must fail");
        assert!(matches!(err, TransportError::TooLarge { size: 6, limit: 5, .. }));
        assert_eq!(buffer.len(), 3);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let mut config = HttpConfig::new("http://127.0.0.1:9");
        config.default_timeout = Some(Duration::from_secs(2));
        let transport = HttpTransport::new(config).unwrap();

        let err = transport
            .send(Request::new(Endpoint::OpcStatus))
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            err,
            TransportError::Network { .. } | TransportError::Timeout { .. }
        ));
    }
}
