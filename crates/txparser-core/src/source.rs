//! The block data source the poller reads from.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ParserError;
use crate::types::{Block, BlockTag};

/// Produces blocks with their transactions populated.
///
/// A returned block's number must be the requested height, or the current
/// head for [`BlockTag::Latest`].
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn fetch_block(&self, tag: BlockTag) -> Result<Block, ParserError>;
}

#[async_trait]
impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    async fn fetch_block(&self, tag: BlockTag) -> Result<Block, ParserError> {
        (**self).fetch_block(tag).await
    }
}
