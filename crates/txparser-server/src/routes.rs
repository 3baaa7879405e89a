//! Route handlers and the server entry point.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use txparser_core::types::Transaction;
use txparser_core::TxParser;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
}

/// Wire shape of one recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Ether, exact decimal.
    pub value: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash().to_string(),
            from: tx.from().to_string(),
            to: tx.to().to_string(),
            value: tx.value_ether(),
        }
    }
}

/// `0x` followed by exactly 40 hex digits, any case.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

fn required_address(query: AddressQuery) -> Result<String, ApiError> {
    match query.address {
        Some(a) if is_valid_address(&a) => Ok(a),
        Some(a) => Err(ApiError::InvalidAddress(a)),
        None => Err(ApiError::InvalidAddress("missing address parameter".into())),
    }
}

async fn current_block(State(parser): State<TxParser>) -> String {
    parser.current_block().to_string()
}

async fn subscribe(
    State(parser): State<TxParser>,
    Query(query): Query<AddressQuery>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let address = required_address(query)?;
    if parser.subscribe(&address) {
        Ok((StatusCode::OK, "Subscription successful"))
    } else {
        Err(ApiError::AlreadySubscribed)
    }
}

async fn transactions(
    State(parser): State<TxParser>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let address = required_address(query)?;
    let txs = parser.transactions(&address).await?;
    Ok(Json(txs.iter().map(TransactionResponse::from).collect()))
}

/// Build the application router.
pub fn router(parser: TxParser) -> Router {
    Router::new()
        .route("/currentblock", get(current_block))
        .route("/subscribe", get(subscribe))
        .route("/transactions", get(transactions))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    request_id = %uuid::Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .with_state(parser)
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    parser: TxParser,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "http server listening");
    }
    axum::serve(listener, router(parser))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn address_validation() {
        assert!(is_valid_address("0x00000000219ab540356cBB839Cbe05303d7705Fa"));
        assert!(is_valid_address(&format!("0x{}", "a".repeat(40))));
        assert!(!is_valid_address("00000000219ab540356cBB839Cbe05303d7705Fa"));
        assert!(!is_valid_address("0x00000000219ab540356cBB839Cbe05303d7705F"));
        assert!(!is_valid_address(&format!("0x{}", "g".repeat(40))));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn response_renders_ether() {
        let tx = Transaction::new("0x01", "0xa", "", U256::from(1_000_000_000_000_000u64)).unwrap();
        let resp = TransactionResponse::from(&tx);
        assert_eq!(resp.value, "0.001");
        assert_eq!(resp.to, "");
    }
}
