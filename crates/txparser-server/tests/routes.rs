use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use txparser_core::error::ParserError;
use txparser_core::store::TransactionStore;
use txparser_core::types::{Address, AddressBatch, Transaction};
use txparser_core::TxParser;
use txparser_server::{router, TransactionResponse};
use txparser_storage::InMemoryStore;

const ALICE: &str = "0xA11cE00000000000000000000000000000000001";
const BOB: &str = "0xb0b0000000000000000000000000000000000002";

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn setup() -> (Router, TxParser, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let parser = TxParser::new(store.clone());
    (router(parser.clone()), parser, store)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Store that fails every call.
struct BrokenStore;

#[async_trait]
impl TransactionStore for BrokenStore {
    async fn save(&self, _batch: AddressBatch) -> Result<(), ParserError> {
        Err(ParserError::Storage("disk on fire".into()))
    }

    async fn transactions(&self, _address: &Address) -> Result<Vec<Transaction>, ParserError> {
        Err(ParserError::Storage("disk on fire".into()))
    }
}

// ─── /currentblock ───────────────────────────────────────────────────────────

#[tokio::test]
async fn current_block_starts_at_zero() {
    let (app, _, _) = setup();
    assert_eq!(get(&app, "/currentblock").await, (StatusCode::OK, "0".into()));
}

#[tokio::test]
async fn current_block_reflects_watermark() {
    let (app, parser, _) = setup();
    parser.state().watermark.set(19_000_123);

    let resp = app
        .clone()
        .oneshot(Request::get("/currentblock").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/plain"), "content-type {ct}");
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"19000123");
}

// ─── /subscribe ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_then_conflict() {
    let (app, parser, _) = setup();

    let uri = format!("/subscribe?address={ALICE}");
    assert_eq!(
        get(&app, &uri).await,
        (StatusCode::OK, "Subscription successful".into())
    );
    assert!(parser.state().registry.is_subscribed(ALICE));

    let upper = format!("/subscribe?address=0x{}", ALICE[2..].to_uppercase());
    assert_eq!(
        get(&app, &upper).await,
        (StatusCode::CONFLICT, "Already subscribed".into())
    );
}

#[tokio::test]
async fn subscribe_rejects_bad_addresses() {
    let (app, parser, _) = setup();

    for uri in [
        "/subscribe",
        "/subscribe?address=",
        "/subscribe?address=0x1234",
        "/subscribe?address=a11ce00000000000000000000000000000000001",
        "/subscribe?address=0xZZ1cE00000000000000000000000000000000001",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
    assert!(parser.state().registry.is_empty());
}

// ─── /transactions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn transactions_returns_json_in_order() {
    let (app, _, store) = setup();

    let t1 = Transaction::new(
        "0x01",
        ALICE.to_lowercase(),
        BOB,
        U256::from(1_500_000_000_000_000_000u128),
    )
    .unwrap();
    let t2 = Transaction::new("0x02", BOB, ALICE.to_lowercase(), U256::from(1u64)).unwrap();
    let mut batch = AddressBatch::new();
    batch.insert(Address::new(ALICE), vec![t1, t2]);
    store.save(batch).await.unwrap();

    let (status, body) = get(&app, &format!("/transactions?address={ALICE}")).await;
    assert_eq!(status, StatusCode::OK);

    let txs: Vec<TransactionResponse> = serde_json::from_str(&body).unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].hash, "0x01");
    assert_eq!(txs[0].value, "1.5");
    assert_eq!(txs[1].hash, "0x02");
    assert_eq!(txs[1].value, "0.000000000000000001");
}

#[tokio::test]
async fn transactions_unknown_address_is_404() {
    let (app, _, _) = setup();
    let (status, _) = get(&app, &format!("/transactions?address={BOB}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transactions_missing_address_is_400() {
    let (app, _, _) = setup();
    let (status, _) = get(&app, "/transactions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_is_generic_500() {
    let parser = TxParser::new(Arc::new(BrokenStore));
    let app = router(parser);

    let (status, body) = get(&app, &format!("/transactions?address={ALICE}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("disk on fire"));
}
