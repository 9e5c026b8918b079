//! ipld-walker - Resumable selector traversal over content-addressed graphs.
//!
//! A [`ControlledWalker`] evaluates a selector against a rooted graph whose
//! edges may point at blocks that have not been loaded yet. Instead of
//! fetching those blocks itself, the walker stops at every block boundary and
//! hands the request back to the caller:
//! - `is_complete` drains every already-materialized node
//! - `current_request` names the link that must be fetched next
//! - `advance` feeds the fetched bytes back in
//! - `abort` feeds a load failure back in
//!
//! # Architecture
//!
//! ```text
//! ControlledWalker ── drain loop ──┬── PendingItem::visit     (Visitor)
//!        │                         ├── PendingItem::children  (Selector + Node)
//!        │                         └── OrderedQueue           (DFS / BFS)
//!        └── advance / abort ───────── PendingItem::resolve   (NodePrototypeChooser)
//! ```
//!
//! The node data model, the selector language and block decoding are
//! collaborators supplied through the traits in [`node`], [`selector`] and
//! [`config`]. The [`driver`] module contains optional loops that run a walk
//! to completion against a [`driver::BlockLoader`].
//!
//! # Example
//!
//! ```ignore
//! let mut walker = ControlledWalker::new(config)?;
//! while !walker.is_complete()? {
//!     let (link, _ctx) = walker.current_request()?;
//!     let block = fetch(&link)?;
//!     walker.advance(block.as_slice())?;
//! }
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod node;
pub mod pending;
pub mod queue;
pub mod selector;
pub mod types;
pub mod walker;


pub use config::{Visitor, WalkConfig, WalkOptions};
pub use context::{LinkContext, WalkContext};
pub use driver::{drive, drive_async, AsyncBlockLoader, BlockLoader, MemoryBlockStore};
pub use error::{
    HashMismatch, NodeError, QueueError, SharedError, SourceError, WalkError, WalkResult,
};
pub use node::{Kind, Node, NodePrototype, NodePrototypeChooser, NodeRef};
pub use queue::OrderedQueue;
pub use selector::{Selector, SelectorRef};
pub use types::{LastBlock, Link, Ordering, Path, PathSegment, Progress, VisitReason};
pub use walker::{ControlledWalker, WalkStats};
