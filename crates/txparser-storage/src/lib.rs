//! txparser-storage — `TransactionStore` backends.
//!
//! Backends:
//! - [`memory`]: in-memory (default; lost on exit)
//! - `sqlite`: SQLite via `sqlx` (feature `sqlite`, single-file persistence)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
