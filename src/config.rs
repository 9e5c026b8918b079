//! Walk configuration.
//!
//! [`WalkOptions`] holds the plain settings and can be loaded from YAML or
//! JSON. [`WalkConfig`] adds the collaborators a walk runs against.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::info;

use crate::context::WalkContext;
use crate::error::WalkError;
use crate::node::{NodePrototypeChooser, NodeRef};
use crate::selector::SelectorRef;
use crate::types::{Ordering, Progress, VisitReason};

// ─── Options ──────────────────────────────────────────────────

/// Plain walk settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkOptions {
    pub ordering: Ordering,
    /// Call the visitor for the root node as well.
    pub visit_root: bool,
    /// Blocks resolved concurrently. Controlled walks only support 1; 0 means 1.
    pub parallelism: usize,
    /// Check every supplied block against the digest of its link.
    pub verify_blocks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            ordering: Ordering::DepthFirst,
            visit_root: false,
            parallelism: 1,
            verify_blocks: true,
        }
    }
}

impl WalkOptions {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let options: WalkOptions =
            serde_yaml::from_str(content).context("Failed to parse walk options YAML")?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let options: WalkOptions =
            serde_json::from_str(content).context("Failed to parse walk options JSON")?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.json` file, or YAML for any other extension.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading walk options from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let options = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Invalid walk options in {}", path.display()))?;

        info!(
            "Loaded walk options: ordering={:?} visit_root={} verify_blocks={}",
            options.ordering, options.visit_root, options.verify_blocks
        );
        Ok(options)
    }

    /// Reject settings a controlled walk cannot honor.
    pub fn validate(&self) -> Result<(), WalkError> {
        if self.parallelism > 1 {
            return Err(WalkError::ParallelismUnsupported {
                requested: self.parallelism,
            });
        }
        Ok(())
    }
}

// ─── Visitor ──────────────────────────────────────────────────

/// Callback invoked once per visited node, in traversal order.
///
/// Returning an error ends the walk with that error.
pub trait Visitor: Send {
    fn visit(&mut self, progress: &Progress, node: &NodeRef, reason: VisitReason) -> Result<()>;
}

impl<F> Visitor for F
where
    F: FnMut(&Progress, &NodeRef, VisitReason) -> Result<()> + Send,
{
    fn visit(&mut self, progress: &Progress, node: &NodeRef, reason: VisitReason) -> Result<()> {
        self(progress, node, reason)
    }
}

// ─── Config ───────────────────────────────────────────────────

/// Everything a [`crate::ControlledWalker`] is built from.
pub struct WalkConfig {
    pub ctx: WalkContext,
    pub root: NodeRef,
    pub selector: SelectorRef,
    pub chooser: Arc<dyn NodePrototypeChooser>,
    pub visitor: Box<dyn Visitor>,
    pub options: WalkOptions,
}

impl WalkConfig {
    pub fn new(
        root: NodeRef,
        selector: SelectorRef,
        chooser: Arc<dyn NodePrototypeChooser>,
        visitor: impl Visitor + 'static,
    ) -> Self {
        Self {
            ctx: WalkContext::new(),
            root,
            selector,
            chooser,
            visitor: Box::new(visitor),
            options: WalkOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.options.ordering = ordering;
        self
    }

    pub fn with_visit_root(mut self, visit_root: bool) -> Self {
        self.options.visit_root = visit_root;
        self
    }

    pub fn with_context(mut self, ctx: WalkContext) -> Self {
        self.ctx = ctx;
        self
    }
}

impl fmt::Debug for WalkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkConfig")
            .field("ctx", &self.ctx)
            .field("root", &self.root)
            .field("selector", &self.selector)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
