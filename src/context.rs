//! Context values threaded through every block request.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use uuid::Uuid;

use crate::node::NodeRef;
use crate::types::Path;

/// Caller-owned token identifying a walk and carrying its cancellation flag.
///
/// The walker never reads the flag. It only hands the context to whoever
/// serves the block, so deadline and cancel policy stays with the caller.
#[derive(Clone, Debug)]
pub struct WalkContext {
    id: Uuid,
    cancelled: Arc<AtomicBool>,
}

impl WalkContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark the walk cancelled. Clones share the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }
}

impl Default for WalkContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything known about a link at the moment its block is requested.
#[derive(Clone, Debug)]
pub struct LinkContext {
    pub ctx: WalkContext,
    /// Path at which the link was found.
    pub link_path: Path,
    /// The node holding the link.
    pub link_node: NodeRef,
}
