//! txparser — poll an Ethereum node, record transactions for subscribed
//! addresses, serve them over HTTP.
//!
//! ```text
//! txparser --http-addr 127.0.0.1:8080 [--rpc-url <url>] [--database <path>]
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use txparser_core::{TransactionStore, TxParser};
use txparser_evm::{EvmBlockSource, HttpClientConfig, HttpTransport};
use txparser_storage::{InMemoryStore, SqliteStore};

mod config;
mod logging;

use config::Config;

const POLLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    logging::init_tracing(&config.log());

    let store: Arc<dyn TransactionStore> = match &config.database {
        Some(path) => {
            let store = SqliteStore::open(path)
                .await
                .with_context(|| format!("failed to open database {path}"))?;
            tracing::info!(path = %path, "using sqlite store");
            Arc::new(store)
        }
        None => {
            tracing::info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };
    let parser = TxParser::new(store);

    let transport = HttpTransport::new(&config.rpc_url, HttpClientConfig::default())
        .context("failed to build RPC transport")?;
    let poller = parser.poller(EvmBlockSource::new(transport), config.poller());

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let poller_task = tokio::spawn(poller.run(shutdown.clone()));
    tracing::info!(
        rpc_url = %config.rpc_url,
        poll_interval_ms = config.poll_interval_ms,
        "poller started"
    );

    let listener = TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    let served = txparser_server::serve(listener, parser, shutdown.clone()).await;

    // The server may also end on its own (I/O error); stop the poller either way.
    shutdown.cancel();
    match tokio::time::timeout(POLLER_SHUTDOWN_TIMEOUT, poller_task).await {
        Ok(Ok(Ok(()))) => tracing::info!("poller stopped"),
        Ok(Ok(Err(e))) => tracing::warn!(error = %e, "poller had stopped on a fatal error"),
        Ok(Err(e)) => tracing::error!(error = %e, "poller task panicked"),
        Err(_) => tracing::warn!(
            timeout_secs = POLLER_SHUTDOWN_TIMEOUT.as_secs(),
            "poller did not stop in time"
        ),
    }

    served.context("http server failed")?;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl-c received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
    token.cancel();
}
