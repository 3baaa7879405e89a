//! EVM block source.
//!
//! Fetches full blocks (transaction objects included) with
//! `eth_getBlockByNumber` and converts them to [`txparser_core::Block`].

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use txparser_core::error::ParserError;
use txparser_core::source::BlockSource;
use txparser_core::types::{Block, BlockTag, Transaction};

use crate::transport::RpcTransport;

/// A block as returned by `eth_getBlockByNumber(_, true)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    pub number: String,
    pub hash: Option<String>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

/// A transaction object inside a full block.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub value: String,
}

impl RawBlock {
    /// Convert to the domain block, validating every numeric field.
    pub fn into_block(self) -> Result<Block, ParserError> {
        let number = parse_hex_u64(&self.number)?;
        let hash = self
            .hash
            .ok_or_else(|| ParserError::Fetch(format!("block {number} has no hash (pending?)")))?;

        let txs = self
            .transactions
            .into_iter()
            .map(|raw| raw.into_transaction(number))
            .collect::<Result<Vec<_>, _>>()?;

        Block::new(hash, number, txs).map_err(|e| malformed(number, e))
    }
}

impl RawTransaction {
    fn into_transaction(self, block: u64) -> Result<Transaction, ParserError> {
        let value = self.value.parse::<U256>().map_err(|e| {
            ParserError::Fetch(format!(
                "block {block}: tx {} has invalid value {:?}: {e}",
                self.hash, self.value
            ))
        })?;
        Transaction::new(self.hash, self.from, self.to.unwrap_or_default(), value)
            .map_err(|e| malformed(block, e))
    }
}

fn malformed(block: u64, e: ParserError) -> ParserError {
    ParserError::Fetch(format!("malformed block {block}: {e}"))
}

/// Parse a `0x`-prefixed hex quantity to u64.
pub fn parse_hex_u64(s: &str) -> Result<u64, ParserError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ParserError::Fetch(format!("invalid hex quantity {s:?}: {e}")))
}

/// The JSON-RPC block parameter for a tag.
pub fn block_param(tag: BlockTag) -> Value {
    match tag {
        BlockTag::Latest => json!("latest"),
        BlockTag::Number(n) => json!(format!("0x{n:x}")),
    }
}

/// [`BlockSource`] over any JSON-RPC transport.
pub struct EvmBlockSource<T> {
    transport: T,
}

impl<T: RpcTransport> EvmBlockSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: RpcTransport> BlockSource for EvmBlockSource<T> {
    async fn fetch_block(&self, tag: BlockTag) -> Result<Block, ParserError> {
        let raw: Option<RawBlock> = self
            .transport
            .call("eth_getBlockByNumber", vec![block_param(tag), json!(true)])
            .await?;

        let block = raw
            .ok_or_else(|| ParserError::Fetch(format!("block {tag} not found")))?
            .into_block()?;

        tracing::trace!(
            block = block.number(),
            txs = block.transactions().len(),
            url = %self.transport.url(),
            "block fetched"
        );
        Ok(block)
    }
}
