//! The controlled walker: a selector traversal that stops at every block
//! boundary and waits for the caller to supply the block.

use serde::Serialize;
use std::io::Read;
use tracing::{debug, trace, warn};

use crate::config::WalkConfig;
use crate::context::LinkContext;
use crate::error::{SourceError, WalkError, WalkResult};
use crate::pending::{BlockSource, PendingItem, Resolver};
use crate::queue::OrderedQueue;
use crate::types::Link;

/// Counters collected over the life of a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub nodes_visited: u64,
    pub blocks_loaded: u64,
    pub max_queue_len: usize,
}

#[derive(Debug)]
enum WalkState {
    /// The current item: resolved items are drained internally, an
    /// unresolved one waits for the caller.
    Pending(PendingItem),
    Completed,
    Failed(WalkError),
}

/// Selector traversal driven one block at a time by the caller.
///
/// ```text
///            ┌──────── advance / abort ────────┐
///            ▼                                 │
///  Draining ──(current item is a link)──► AwaitingResolution
///     │
///     ├──(queue empty)──────────────────► Completed
///     └──(visitor / exploration error)──► Failed
/// ```
///
/// Only one block request is ever outstanding.
pub struct ControlledWalker {
    config: WalkConfig,
    queue: OrderedQueue<PendingItem>,
    state: WalkState,
    stats: WalkStats,
}

impl ControlledWalker {
    /// Build a walker positioned at the configured root.
    ///
    /// Fails if the options ask for anything a controlled walk cannot do,
    /// such as resolving more than one block at a time.
    pub fn new(config: WalkConfig) -> WalkResult<Self> {
        config.options.validate()?;
        let root = PendingItem::root(config.root.clone(), config.selector.clone());
        debug!(
            walk_id = %config.ctx.id(),
            ordering = ?config.options.ordering,
            visit_root = config.options.visit_root,
            "starting controlled walk"
        );
        Ok(Self {
            queue: OrderedQueue::new(config.options.ordering),
            state: WalkState::Pending(root),
            stats: WalkStats::default(),
            config,
        })
    }

    /// Drain every node that needs no block and report whether the walk is
    /// over.
    ///
    /// `Ok(false)` means a block is waiting to be supplied. Once the walk has
    /// ended the stored outcome is returned on every call.
    pub fn is_complete(&mut self) -> WalkResult<bool> {
        self.drain();
        match &self.state {
            WalkState::Pending(_) => Ok(false),
            WalkState::Completed => Ok(true),
            WalkState::Failed(err) => Err(err.clone()),
        }
    }

    /// The link whose block must be supplied next.
    pub fn current_request(&mut self) -> WalkResult<(Link, LinkContext)> {
        self.drain();
        match &self.state {
            WalkState::Pending(item) => item.resolve_parameters(&self.config.ctx),
            WalkState::Completed | WalkState::Failed(_) => Err(WalkError::NoCurrentRequest),
        }
    }

    /// Supply the block for the current request.
    ///
    /// On a resolution failure the walk ends with that error, which is also
    /// returned here.
    pub fn advance<R: Read>(&mut self, mut reader: R) -> WalkResult<()> {
        self.drain();
        self.resolve_current(Ok(&mut reader))
    }

    /// Fail the current request with `err` instead of a block.
    ///
    /// Ends the walk with the resulting error. Does nothing once the walk is
    /// over.
    pub fn abort(&mut self, err: SourceError) {
        self.drain();
        // The outcome is kept as the completion error.
        let _ = self.resolve_current(Err(err));
    }

    /// The error the walk ended with, if it failed.
    pub fn completion_error(&self) -> Option<&WalkError> {
        match &self.state {
            WalkState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Resolve the current item from `source`, then keep draining.
    fn resolve_current(&mut self, source: BlockSource<'_>) -> WalkResult<()> {
        let WalkState::Pending(item) = &self.state else {
            return Err(WalkError::AlreadyComplete);
        };
        let resolver = Resolver {
            ctx: &self.config.ctx,
            chooser: self.config.chooser.as_ref(),
            verify_blocks: self.config.options.verify_blocks,
        };
        match item.resolve(&resolver, source) {
            Ok(resolved) => {
                self.stats.blocks_loaded += 1;
                debug!(path = %resolved.progress().path, "block resolved");
                self.state = WalkState::Pending(resolved);
                self.drain();
                Ok(())
            }
            Err(err) => {
                warn!(walk_id = %self.config.ctx.id(), error = %err, "controlled walk failed");
                self.state = WalkState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn drain(&mut self) {
        let mut stepped = false;
        while matches!(&self.state, WalkState::Pending(item) if item.is_resolved()) {
            stepped = true;
            let state = std::mem::replace(&mut self.state, WalkState::Completed);
            let WalkState::Pending(item) = state else {
                break;
            };
            self.state = match self.step(item) {
                Ok(Some(next)) => WalkState::Pending(next),
                Ok(None) => {
                    debug!(
                        walk_id = %self.config.ctx.id(),
                        stats = ?self.stats,
                        "controlled walk complete"
                    );
                    WalkState::Completed
                }
                Err(err) => {
                    warn!(walk_id = %self.config.ctx.id(), error = %err, "controlled walk failed");
                    WalkState::Failed(err)
                }
            };
        }
        if !stepped {
            return;
        }
        if let WalkState::Pending(item) = &self.state {
            match item.node().as_link() {
                Ok(link) => {
                    debug!(path = %item.progress().path, link = %link, "waiting for block")
                }
                Err(_) => debug!(path = %item.progress().path, "waiting for block"),
            }
        }
    }

    /// Visit and expand one resolved item, returning the next item if any.
    fn step(&mut self, item: PendingItem) -> WalkResult<Option<PendingItem>> {
        if self.config.options.visit_root || !item.is_root() {
            trace!(path = %item.progress().path, "visit");
            item.visit(self.config.visitor.as_mut())
                .map_err(|err| WalkError::Visitor(err.into()))?;
            self.stats.nodes_visited += 1;
        }

        let children = item.children()?;
        trace!(path = %item.progress().path, children = children.len(), "enqueue");
        self.queue.enqueue(children);
        self.stats.max_queue_len = self.stats.max_queue_len.max(self.queue.len());

        Ok(self.queue.dequeue().ok())
    }
}
