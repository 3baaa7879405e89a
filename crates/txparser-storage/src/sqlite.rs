//! SQLite transaction store.
//!
//! Persists every recorded (address, transaction) pair to a single SQLite
//! file. Rows are read back in insertion order, which is the order the
//! poller saved them in.
//!
//! # Usage
//! ```rust,no_run
//! use txparser_storage::sqlite::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStore::open("./txparser.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStore::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use alloy_primitives::U256;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use txparser_core::error::ParserError;
use txparser_core::store::TransactionStore;
use txparser_core::types::{Address, AddressBatch, Transaction};

fn storage(e: sqlx::Error) -> ParserError {
    ParserError::Storage(e.to_string())
}

/// SQLite-backed address → transactions index.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./txparser.db"`) or a full
    /// SQLite URL (`"sqlite:./txparser.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, ParserError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage)?;

        let store = Self { pool };
        store.init_schema(true).await?;
        Ok(store)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Pinned to one connection: every new `:memory:` connection is a
    /// separate, empty database.
    pub async fn in_memory() -> Result<Self, ParserError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage)?;

        let store = Self { pool };
        store.init_schema(false).await?;
        Ok(store)
    }

    async fn init_schema(&self, wal: bool) -> Result<(), ParserError> {
        if wal {
            sqlx::query("PRAGMA journal_mode=WAL;")
                .execute(&self.pool)
                .await
                .map_err(storage)?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS address_transactions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                address      TEXT NOT NULL,
                tx_hash      TEXT NOT NULL,
                from_address TEXT NOT NULL,
                to_address   TEXT NOT NULL,
                value_wei    TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_address_transactions_address
             ON address_transactions (address);",
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    /// Total number of stored (address, transaction) rows.
    pub async fn row_count(&self) -> Result<u64, ParserError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM address_transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;

        let cnt: i64 = row.get("cnt");
        Ok(cnt as u64)
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn save(&self, batch: AddressBatch) -> Result<(), ParserError> {
        let mut db_tx = self.pool.begin().await.map_err(storage)?;
        let mut rows = 0usize;

        for (address, txs) in &batch {
            for t in txs {
                sqlx::query(
                    "INSERT INTO address_transactions
                     (address, tx_hash, from_address, to_address, value_wei)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(address.as_str())
                .bind(t.hash())
                .bind(t.from())
                .bind(t.to())
                .bind(t.value().to_string())
                .execute(&mut *db_tx)
                .await
                .map_err(storage)?;
                rows += 1;
            }
        }

        db_tx.commit().await.map_err(storage)?;
        debug!(addresses = batch.len(), rows, "transactions stored");
        Ok(())
    }

    async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>, ParserError> {
        let rows = sqlx::query(
            "SELECT tx_hash, from_address, to_address, value_wei
             FROM address_transactions WHERE address = ? ORDER BY id",
        )
        .bind(address.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        if rows.is_empty() {
            return Err(ParserError::NotFound {
                address: address.clone(),
            });
        }

        let mut txs = Vec::with_capacity(rows.len());
        for row in rows {
            let value: String = row.get("value_wei");
            let value = value
                .parse::<U256>()
                .map_err(|e| ParserError::Storage(format!("corrupt value_wei {value:?}: {e}")))?;
            let tx = Transaction::new(
                row.get::<String, _>("tx_hash"),
                row.get::<String, _>("from_address"),
                row.get::<String, _>("to_address"),
                value,
            )
            .map_err(|e| ParserError::Storage(e.to_string()))?;
            txs.push(tx);
        }
        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, from: &str, to: &str, wei: u128) -> Transaction {
        Transaction::new(hash, from, to, U256::from(wei)).unwrap()
    }

    fn batch(entries: &[(&str, Transaction)]) -> AddressBatch {
        let mut b = AddressBatch::new();
        for (address, t) in entries {
            b.entry(Address::new(address)).or_default().push(t.clone());
        }
        b
    }

    #[tokio::test]
    async fn save_and_query_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let t = tx("0x01", "0xAAA", "", 1_500_000_000_000_000_000);
        store.save(batch(&[("0xaaa", t.clone())])).await.unwrap();

        let got = store.transactions(&Address::new("0xaaa")).await.unwrap();
        assert_eq!(got, vec![t]);
        assert_eq!(got[0].value_ether(), "1.5");
        assert_eq!(got[0].to(), "");
    }

    #[tokio::test]
    async fn query_preserves_save_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .save(batch(&[
                ("0xaaa", tx("0x01", "0xaaa", "0xbbb", 1)),
                ("0xaaa", tx("0x02", "0xccc", "0xaaa", 2)),
            ]))
            .await
            .unwrap();
        store
            .save(batch(&[("0xaaa", tx("0x03", "0xaaa", "0xddd", 3))]))
            .await
            .unwrap();

        let got = store.transactions(&Address::new("0xaaa")).await.unwrap();
        let hashes: Vec<_> = got.iter().map(|t| t.hash()).collect();
        assert_eq!(hashes, ["0x01", "0x02", "0x03"]);
    }

    #[tokio::test]
    async fn same_transaction_under_two_addresses() {
        let store = SqliteStore::in_memory().await.unwrap();
        let t = tx("0x01", "0xaaa", "0xbbb", 7);
        store
            .save(batch(&[("0xaaa", t.clone()), ("0xbbb", t.clone())]))
            .await
            .unwrap();

        assert_eq!(store.row_count().await.unwrap(), 2);
        assert_eq!(store.transactions(&Address::new("0xaaa")).await.unwrap(), vec![t.clone()]);
        assert_eq!(store.transactions(&Address::new("0xbbb")).await.unwrap(), vec![t]);
    }

    #[tokio::test]
    async fn unknown_address_is_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store
            .transactions(&Address::new("0xeee"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn large_values_survive() {
        let store = SqliteStore::in_memory().await.unwrap();
        let huge = U256::MAX;
        let t = Transaction::new("0x01", "0xaaa", "0xbbb", huge).unwrap();
        store.save(batch(&[("0xaaa", t)])).await.unwrap();

        let got = store.transactions(&Address::new("0xaaa")).await.unwrap();
        assert_eq!(got[0].value(), U256::MAX);
    }
}
