//! Units of traversal work and the two things that can be done with them:
//! resolve a link into a node, or explore a node into its selected children.

use anyhow::anyhow;
use std::io::Read;
use tracing::trace;

use crate::config::Visitor;
use crate::context::{LinkContext, WalkContext};
use crate::error::{HashMismatch, SourceError, WalkError, WalkResult};
use crate::node::{Kind, NodePrototypeChooser, NodeRef};
use crate::selector::SelectorRef;
use crate::types::{Link, PathSegment, Progress, VisitReason};

/// Upper bound on capacity reserved from a node's own size hint.
const MAX_CHILD_CAPACITY: usize = 64;

/// What the caller supplied for the link being resolved.
pub type BlockSource<'a> = Result<&'a mut dyn Read, SourceError>;

/// Collaborators needed to resolve a link.
pub struct Resolver<'a> {
    pub ctx: &'a WalkContext,
    pub chooser: &'a dyn NodePrototypeChooser,
    pub verify_blocks: bool,
}

/// One unit of traversal work.
///
/// Unresolved while `node` is a link; resolved once it holds the loaded node.
#[derive(Clone, Debug)]
pub struct PendingItem {
    node: NodeRef,
    selector: SelectorRef,
    progress: Progress,
    is_root: bool,
}

impl PendingItem {
    /// The item a walk starts from.
    pub fn root(node: NodeRef, selector: SelectorRef) -> Self {
        Self {
            node,
            selector,
            progress: Progress::default(),
            is_root: true,
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn selector(&self) -> &SelectorRef {
        &self.selector
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// True only for the configured root node itself, not for what a root
    /// link resolves to.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_resolved(&self) -> bool {
        self.node.kind() != Kind::Link
    }

    // ── Resolution ──

    /// The link this item waits on and the context to load it in.
    pub fn resolve_parameters(&self, ctx: &WalkContext) -> WalkResult<(Link, LinkContext)> {
        let link = self
            .node
            .as_link()
            .map_err(|source| WalkError::MalformedLink {
                path: self.progress.path.clone(),
                source,
            })?;
        let link_ctx = LinkContext {
            ctx: ctx.clone(),
            link_path: self.progress.path.clone(),
            link_node: self.node.clone(),
        };
        Ok((link, link_ctx))
    }

    /// Turn this unresolved item into a resolved one using exactly one
    /// caller-supplied block.
    ///
    /// A skip from the source is returned as [`WalkError::Skip`] unchanged;
    /// every other failure is wrapped with the path and link.
    pub fn resolve(&self, resolver: &Resolver<'_>, source: BlockSource<'_>) -> WalkResult<Self> {
        let (link, link_ctx) = self.resolve_parameters(resolver.ctx)?;
        let path = &self.progress.path;

        let prototype = resolver
            .chooser
            .choose(&link, &link_ctx)
            .map_err(|source| WalkError::PrototypeSelection {
                path: path.clone(),
                link,
                source: source.into(),
            })?;

        let load_err = |source: anyhow::Error| WalkError::Load {
            path: path.clone(),
            link,
            source: source.into(),
        };

        let reader = match source {
            Ok(reader) => reader,
            Err(SourceError::Skip { reason }) => return Err(WalkError::Skip { reason }),
            Err(SourceError::Other(err)) => return Err(load_err(err)),
        };

        let mut block = Vec::new();
        reader
            .read_to_end(&mut block)
            .map_err(|err| load_err(anyhow::Error::new(err).context("failed to read block")))?;

        if resolver.verify_blocks {
            let actual = Link::for_block(&block);
            if actual != link {
                return Err(load_err(anyhow::Error::new(HashMismatch {
                    expected: link,
                    actual,
                })));
            }
        }

        let node = prototype.build(&link, &block).map_err(load_err)?;
        trace!(path = %path, link = %link, bytes = block.len(), "resolved block");

        Ok(Self {
            node,
            selector: self.selector.clone(),
            progress: self.progress.crossed(link),
            is_root: false,
        })
    }

    // ── Visiting ──

    /// Report this node to the visitor as a match or a candidate.
    pub fn visit(&self, visitor: &mut dyn Visitor) -> anyhow::Result<()> {
        if !self.is_resolved() {
            return Err(anyhow!("cannot visit unresolved node at \"{}\"", self.progress.path));
        }
        let reason = if self.selector.decide(self.node.as_ref()) {
            VisitReason::SelectionMatch
        } else {
            VisitReason::SelectionCandidate
        };
        visitor.visit(&self.progress, &self.node, reason)
    }

    // ── Exploration ──

    /// The selected children of this node, in exploration order.
    ///
    /// Scalars and links have no children. When the selector names its
    /// interests only those segments are looked up, and absent ones are
    /// skipped; otherwise every child is offered to the selector.
    pub fn children(&self) -> WalkResult<Vec<PendingItem>> {
        if !self.node.kind().is_composite() {
            return Ok(Vec::new());
        }
        match self.selector.interests() {
            None => self.explore_all(),
            Some(segments) => Ok(self.explore_selective(segments)),
        }
    }

    fn explore_all(&self) -> WalkResult<Vec<PendingItem>> {
        let mut children = Vec::with_capacity(self.node.len().min(MAX_CHILD_CAPACITY));
        for entry in self.node.entries() {
            let (segment, child) = entry.map_err(|source| WalkError::Exploration {
                path: self.progress.path.clone(),
                source,
            })?;
            if let Some(item) = self.child(segment, child) {
                children.push(item);
            }
        }
        Ok(children)
    }

    fn explore_selective(&self, segments: Vec<PathSegment>) -> Vec<PendingItem> {
        let mut children = Vec::with_capacity(segments.len());
        for segment in segments {
            let Ok(child) = self.node.lookup_by_segment(&segment) else {
                continue;
            };
            if let Some(item) = self.child(segment, child) {
                children.push(item);
            }
        }
        children
    }

    fn child(&self, segment: PathSegment, node: NodeRef) -> Option<PendingItem> {
        let selector = self.selector.explore(self.node.as_ref(), &segment)?;
        Some(PendingItem {
            node,
            selector,
            progress: self.progress.descend(segment),
            is_root: false,
        })
    }
}
