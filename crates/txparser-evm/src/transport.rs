//! The `RpcTransport` trait and its reqwest-backed HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::retry::{RetryConfig, RetryPolicy};

/// Sends one JSON-RPC request and returns the decoded response.
///
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// The endpoint this transport talks to.
    fn url(&self) -> &str;

    /// Call `method` with a fresh random id, check the echoed id and
    /// deserialize the result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let req = JsonRpcRequest::new(RpcId::random(), method, params);
        let expected = req.id.clone();
        let resp = self.send(req).await?;
        if resp.id != expected {
            return Err(TransportError::IdMismatch {
                expected,
                actual: resp.id,
            });
        }
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP JSON-RPC transport with per-request timeout and retry on
/// transient failures.
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
        })
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.request_error(e))?;
        if !status.is_success() {
            return Err(TransportError::Http(format!("HTTP {}: {body}", status.as_u16())));
        }

        Ok(serde_json::from_str::<JsonRpcResponse>(&body)?)
    }

    fn request_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(&req).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    match self.retry.next_delay(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                url = %self.url,
                                method = %req.method,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            tracing::error!(
                                attempts = attempt,
                                error = %e,
                                url = %self.url,
                                method = %req.method,
                                "max retries exceeded"
                            );
                            return Err(e);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = HttpClientConfig::default();
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.retry.max_retries, 3);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let transport = HttpTransport::new(
            "http://127.0.0.1:1",
            HttpClientConfig {
                retry: RetryConfig::disabled(),
                request_timeout: Duration::from_secs(2),
            },
        )
        .unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:1");

        let err = transport
            .call::<Value>("eth_blockNumber", vec![])
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err}");
    }
}
