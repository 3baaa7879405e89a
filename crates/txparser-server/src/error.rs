//! Mapping from query failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use txparser_core::error::ParserError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed `address` parameter.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("Already subscribed")]
    AlreadySubscribed,

    #[error("no transactions found for address {0}")]
    NotFound(String),

    /// Anything else; the detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            Self::AlreadySubscribed => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ParserError> for ApiError {
    fn from(e: ParserError) -> Self {
        match e {
            ParserError::NotFound { address } => Self::NotFound(address.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txparser_core::types::Address;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::InvalidAddress("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AlreadySubscribed.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("0x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("db".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parser_errors_map_by_kind() {
        let nf: ApiError = ParserError::NotFound {
            address: Address::new("0xABC"),
        }
        .into();
        assert!(matches!(nf, ApiError::NotFound(ref a) if a == "0xabc"));

        let storage: ApiError = ParserError::Storage("disk full".into()).into();
        assert!(matches!(storage, ApiError::Internal(_)));
    }
}
