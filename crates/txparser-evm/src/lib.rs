//! txparser-evm — JSON-RPC block source for EVM chains.
//!
//! ```text
//! EvmBlockSource ──▶ RpcTransport ──▶ HttpTransport (reqwest + retry)
//!       │
//!       └─ eth_getBlockByNumber [tag, true] ──▶ txparser_core::Block
//! ```

pub mod error;
pub mod request;
pub mod retry;
pub mod source;
pub mod transport;

pub use error::TransportError;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use retry::{RetryConfig, RetryPolicy};
pub use source::EvmBlockSource;
pub use transport::{HttpClientConfig, HttpTransport, RpcTransport};
