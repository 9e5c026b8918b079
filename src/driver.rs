//! Loops that run a controlled walk to the end against a block loader.
//!
//! These are conveniences over the four walker operations; they add no
//! traversal behavior of their own. Each one honors the walk context's
//! cancellation flag before every load.

use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::context::LinkContext;
use crate::error::{SourceError, WalkResult};
use crate::types::Link;
use crate::walker::{ControlledWalker, WalkStats};

/// Produces the block for a link, synchronously.
pub trait BlockLoader {
    fn load(&self, link: &Link, ctx: &LinkContext) -> Result<Vec<u8>, SourceError>;
}

/// Produces the block for a link, asynchronously.
#[async_trait]
pub trait AsyncBlockLoader: Send + Sync {
    async fn load(&self, link: &Link, ctx: &LinkContext) -> Result<Vec<u8>, SourceError>;
}

/// Run `walker` until it completes, loading every requested block from `loader`.
pub fn drive<L>(walker: &mut ControlledWalker, loader: &L) -> WalkResult<WalkStats>
where
    L: BlockLoader + ?Sized,
{
    while !walker.is_complete()? {
        let (link, ctx) = walker.current_request()?;
        if ctx.ctx.is_cancelled() {
            walker.abort(cancelled(&ctx));
            continue;
        }
        match loader.load(&link, &ctx) {
            Ok(block) => walker.advance(block.as_slice())?,
            Err(err) => walker.abort(err),
        }
    }
    debug!(stats = ?walker.stats(), "drive finished");
    Ok(walker.stats())
}

/// Async counterpart of [`drive`]. Yields to the scheduler between blocks.
pub async fn drive_async<L>(walker: &mut ControlledWalker, loader: &L) -> WalkResult<WalkStats>
where
    L: AsyncBlockLoader + ?Sized,
{
    while !walker.is_complete()? {
        let (link, ctx) = walker.current_request()?;
        if ctx.ctx.is_cancelled() {
            walker.abort(cancelled(&ctx));
            continue;
        }
        match loader.load(&link, &ctx).await {
            Ok(block) => walker.advance(block.as_slice())?,
            Err(err) => walker.abort(err),
        }
        tokio::task::yield_now().await;
    }
    debug!(stats = ?walker.stats(), "drive_async finished");
    Ok(walker.stats())
}

fn cancelled(ctx: &LinkContext) -> SourceError {
    SourceError::Other(anyhow!("walk {} cancelled", ctx.ctx.id()))
}

// ─── In-memory store ──────────────────────────────────────────

/// Blocks held in memory, addressed by their digest.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<Link, Vec<u8>>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block and return its link.
    pub fn put(&self, block: impl Into<Vec<u8>>) -> Link {
        let block = block.into();
        let link = Link::for_block(&block);
        self.blocks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(link, block);
        link
    }

    pub fn get(&self, link: &Link) -> Option<Vec<u8>> {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(link)
            .cloned()
    }

    pub fn contains(&self, link: &Link) -> bool {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(link)
    }

    pub fn len(&self) -> usize {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlockLoader for MemoryBlockStore {
    fn load(&self, link: &Link, ctx: &LinkContext) -> Result<Vec<u8>, SourceError> {
        self.get(link).ok_or_else(|| {
            SourceError::Other(anyhow!(
                "block {link} not found at \"{}\"",
                ctx.link_path
            ))
        })
    }
}

#[async_trait]
impl AsyncBlockLoader for MemoryBlockStore {
    async fn load(&self, link: &Link, ctx: &LinkContext) -> Result<Vec<u8>, SourceError> {
        BlockLoader::load(self, link, ctx)
    }
}
