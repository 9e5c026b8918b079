//! The node data model the walker consumes.
//!
//! Nodes, their kinds and block decoding belong to the caller. The walker
//! only needs to ask a node what it is, reach its children and, for links,
//! read the link it holds.

use std::fmt;
use std::sync::Arc;

use crate::context::LinkContext;
use crate::error::NodeError;
use crate::types::{Link, PathSegment};

/// The kind of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Map,
    List,
    Link,
}

impl Kind {
    /// Maps and lists have children to explore.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Map | Kind::List)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Map => "map",
            Kind::List => "list",
            Kind::Link => "link",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Children in natural order, as yielded by [`Node::entries`].
pub type Entries<'a> = Box<dyn Iterator<Item = Result<(PathSegment, NodeRef), NodeError>> + 'a>;

/// A value in the graph being walked.
pub trait Node: fmt::Debug + Send + Sync {
    fn kind(&self) -> Kind;

    /// Direct child lookup. Fails with [`NodeError::NotFound`] for absent segments.
    fn lookup_by_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError>;

    /// All children in natural order. Empty for scalars and links.
    fn entries(&self) -> Entries<'_>;

    /// The link this node holds. Fails for every kind except [`Kind::Link`].
    fn as_link(&self) -> Result<Link, NodeError>;

    /// Number of children; used only as a capacity hint.
    fn len(&self) -> usize {
        0
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to a node.
pub type NodeRef = Arc<dyn Node>;

/// An in-memory representation that can be built from a block.
pub trait NodePrototype: Send + Sync {
    /// Decode a block already verified against `link`.
    fn build(&self, link: &Link, block: &[u8]) -> anyhow::Result<NodeRef>;
}

impl<F> NodePrototype for F
where
    F: Fn(&Link, &[u8]) -> anyhow::Result<NodeRef> + Send + Sync,
{
    fn build(&self, link: &Link, block: &[u8]) -> anyhow::Result<NodeRef> {
        self(link, block)
    }
}

/// Picks the representation to build for a link before its block is loaded.
pub trait NodePrototypeChooser: Send + Sync {
    fn choose(&self, link: &Link, ctx: &LinkContext) -> anyhow::Result<Arc<dyn NodePrototype>>;
}

impl<F> NodePrototypeChooser for F
where
    F: Fn(&Link, &LinkContext) -> anyhow::Result<Arc<dyn NodePrototype>> + Send + Sync,
{
    fn choose(&self, link: &Link, ctx: &LinkContext) -> anyhow::Result<Arc<dyn NodePrototype>> {
        self(link, ctx)
    }
}

/// A chooser that always answers with the same prototype.
pub struct SinglePrototype(pub Arc<dyn NodePrototype>);

impl NodePrototypeChooser for SinglePrototype {
    fn choose(&self, _link: &Link, _ctx: &LinkContext) -> anyhow::Result<Arc<dyn NodePrototype>> {
        Ok(self.0.clone())
    }
}
