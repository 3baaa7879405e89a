//! txparser-core — the polling and indexing engine behind txparser.
//!
//! # Architecture
//!
//! ```text
//! TxParser (readers: current block, subscribe, transactions)
//!     └── ParserState ──────────────┐
//!           ├── SubscriptionRegistry │  shared with
//!           └── Watermark            │
//! BlockPoller ───────────────────────┘
//!     ├── BlockSource       (fetch "latest" or a block by number)
//!     ├── filter::match_block (block × registry snapshot → AddressBatch)
//!     └── TransactionStore  (append-only per-address transaction lists)
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod parser;
pub mod poller;
pub mod registry;
pub mod source;
pub mod store;
pub mod types;
pub mod watermark;

pub use config::PollerConfig;
pub use error::ParserError;
pub use parser::{ParserState, TxParser};
pub use poller::{BlockPoller, TickOutcome};
pub use registry::{RegistrySnapshot, SubscriptionRegistry};
pub use source::BlockSource;
pub use store::TransactionStore;
pub use types::{format_ether, Address, AddressBatch, Block, BlockTag, Transaction};
pub use watermark::Watermark;
