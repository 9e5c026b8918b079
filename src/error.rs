//! Error types for controlled walks.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::types::{Link, Path, PathSegment};

/// Errors that end a walk or reject a walker operation.
///
/// Every variant raised after construction is terminal: the walker records
/// it as the completion error and accepts no further input.
#[derive(Debug, Clone, Error)]
pub enum WalkError {
    /// The configuration asked for concurrent block resolution.
    #[error("controlled walk does not support parallelism (requested {requested})")]
    ParallelismUnsupported { requested: usize },

    /// The item waiting for resolution does not hold a link.
    #[error("error traversing node at \"{path}\": not a link: {source}")]
    MalformedLink {
        path: Path,
        #[source]
        source: NodeError,
    },

    /// The prototype chooser could not pick a representation for a link.
    #[error("error traversing node at \"{path}\": could not load link {link}: {source}")]
    PrototypeSelection {
        path: Path,
        link: Link,
        #[source]
        source: SharedError,
    },

    /// The block for a link could not be read, verified or decoded.
    #[error("error traversing node at \"{path}\": could not load link {link}: {source}")]
    Load {
        path: Path,
        link: Link,
        #[source]
        source: SharedError,
    },

    /// The block source asked for this branch to be skipped.
    #[error("skip requested: {reason}")]
    Skip { reason: String },

    /// Children of an already-resolved node could not be enumerated.
    #[error("error exploring node at \"{path}\": {source}")]
    Exploration {
        path: Path,
        #[source]
        source: NodeError,
    },

    /// The visitor callback failed.
    #[error(transparent)]
    Visitor(SharedError),

    /// The walk is complete, so nothing is waiting to be loaded.
    #[error("traversal done, no current request")]
    NoCurrentRequest,

    /// `advance` was called on a completed walk.
    #[error("cannot advance when done")]
    AlreadyComplete,
}

impl WalkError {
    /// True when the error came from a block source asking to skip a branch.
    pub fn is_skip(&self) -> bool {
        matches!(self, WalkError::Skip { .. })
    }

    /// True for hard failures while resolving a link. A skip is not one.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            WalkError::MalformedLink { .. }
                | WalkError::PrototypeSelection { .. }
                | WalkError::Load { .. }
        )
    }

    /// The digest mismatch behind a [`WalkError::Load`], if that was the cause.
    pub fn hash_mismatch(&self) -> Option<&HashMismatch> {
        match self {
            WalkError::Load { source, .. } => source.inner().downcast_ref::<HashMismatch>(),
            _ => None,
        }
    }
}

/// A supplied block whose digest is not the link it was supplied for.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("hash mismatch: block hashes to {actual}")]
pub struct HashMismatch {
    pub expected: Link,
    pub actual: Link,
}

/// Result type for walker operations.
pub type WalkResult<T> = Result<T, WalkError>;

/// An opaque caller or collaborator error that can be stored as a walk's
/// completion error and still handed out on every query.
#[derive(Debug, Clone)]
pub struct SharedError(Arc<anyhow::Error>);

impl SharedError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl StdError for SharedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let inner: &(dyn StdError + 'static) = &**self.0;
        inner.source()
    }
}

impl From<anyhow::Error> for SharedError {
    fn from(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }
}

/// A load failure supplied by the caller in place of block bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Omit the branch behind this link.
    #[error("skip: {reason}")]
    Skip { reason: String },

    /// Any other failure to produce the block.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SourceError {
    pub fn skip(reason: impl Into<String>) -> Self {
        SourceError::Skip {
            reason: reason.into(),
        }
    }
}

/// Errors raised by node implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("no child at segment {segment}")]
    NotFound { segment: PathSegment },

    #[error("expected {expected} node, found {actual}")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("iteration failed: {message}")]
    Iteration { message: String },
}

/// Errors raised by [`crate::queue::OrderedQueue`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is empty")]
    Empty,
}
