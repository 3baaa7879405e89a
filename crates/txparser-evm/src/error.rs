//! Transport-level error types.

use thiserror::Error;

use txparser_core::error::ParserError;

use crate::request::{JsonRpcError, RpcId};

/// Errors that can occur while talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The response id does not echo the request id.
    #[error("response id {actual} does not match request id {expected}")]
    IdMismatch { expected: RpcId, actual: RpcId },

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response body could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and the request may be resent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

impl From<TransportError> for ParserError {
    fn from(e: TransportError) -> Self {
        ParserError::Fetch(e.to_string())
    }
}
