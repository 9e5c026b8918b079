//! The selector interface driving which nodes are visited and explored.

use std::fmt;
use std::sync::Arc;

use crate::node::Node;
use crate::types::PathSegment;

/// A compiled selector state.
///
/// Each node is governed by one selector state; exploring a child yields the
/// state that governs that child, or `None` to prune it.
pub trait Selector: fmt::Debug + Send + Sync {
    /// Child segments this selector cares about. `None` means every child
    /// must be offered to [`Selector::explore`].
    fn interests(&self) -> Option<Vec<PathSegment>>;

    /// Selector for the child at `segment` of `node`, or `None` to prune it.
    fn explore(&self, node: &dyn Node, segment: &PathSegment) -> Option<SelectorRef>;

    /// True if `node` is a match rather than just a candidate on the way.
    fn decide(&self, node: &dyn Node) -> bool;
}

/// Shared handle to a selector state.
pub type SelectorRef = Arc<dyn Selector>;
