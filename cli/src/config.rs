//! Command-line / environment configuration.

use clap::Parser;

use txparser_core::PollerConfig;

use crate::logging::LogConfig;

pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";

#[derive(Debug, Parser)]
#[command(
    name = "txparser",
    about = "Watch an Ethereum node and record transactions for subscribed addresses",
    long_about = "
txparser polls an Ethereum JSON-RPC endpoint for new blocks, records every
transaction whose sender or recipient is subscribed, and serves the results
over HTTP.

ROUTES:
  GET /currentblock
  GET /subscribe?address=0x...
  GET /transactions?address=0x...
",
    version
)]
pub struct Config {
    /// Address the HTTP server listens on, e.g. 127.0.0.1:8080
    #[arg(long, env = "HTTP_ADDR")]
    pub http_addr: String,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "TXPARSER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Delay between head polls, in milliseconds
    #[arg(long, env = "TXPARSER_POLL_INTERVAL_MS", default_value_t = 10_000)]
    pub poll_interval_ms: u64,

    /// SQLite database path; the in-memory store is used when absent
    #[arg(long, env = "TXPARSER_DATABASE")]
    pub database: Option<String>,

    /// Log filter: trace | debug | info | warn | error (RUST_LOG wins if set)
    #[arg(long, env = "TXPARSER_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit JSON structured logs
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    pub fn poller(&self) -> PollerConfig {
        PollerConfig::default().poll_interval_ms(self.poll_interval_ms)
    }

    pub fn log(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["txparser", "--http-addr", "127.0.0.1:8080"]).unwrap();
        assert_eq!(cfg.http_addr, "127.0.0.1:8080");
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.poller().poll_interval(), Duration::from_secs(10));
        assert!(cfg.database.is_none());
        assert_eq!(cfg.log().level, "info");
        assert!(!cfg.log().json);
    }

    #[test]
    fn overrides() {
        let cfg = Config::try_parse_from([
            "txparser",
            "--http-addr",
            "0.0.0.0:9000",
            "--rpc-url",
            "http://localhost:8545",
            "--poll-interval-ms",
            "250",
            "--database",
            "/tmp/tx.db",
            "--log-level",
            "debug",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cfg.rpc_url, "http://localhost:8545");
        assert_eq!(cfg.poller().poll_interval(), Duration::from_millis(250));
        assert_eq!(cfg.database.as_deref(), Some("/tmp/tx.db"));
        assert!(cfg.log().json);
    }

    #[test]
    fn http_addr_is_required() {
        if std::env::var_os("HTTP_ADDR").is_some() {
            return;
        }
        assert!(Config::try_parse_from(["txparser"]).is_err());
    }
}
