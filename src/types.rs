use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ─── Paths ────────────────────────────────────────────────────

/// One step from a composite node to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Map key.
    Key(String),
    /// List index.
    Index(i64),
}

impl PathSegment {
    /// The segment as a map key, if it is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    /// The segment as a list index. Keys that parse as integers count.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(k) => k.parse().ok(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        PathSegment::Index(index)
    }
}

/// How a traversal reached a point, starting from the root.
///
/// Paths are never mutated once built; [`Path::append`] returns a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path naming the root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// A copy of this path with one more segment at the end.
    pub fn append(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

// ─── Links ────────────────────────────────────────────────────

/// Content address of a block: the sha2-256 digest of its bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Link {
    digest: [u8; 32],
}

impl Link {
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self { digest }
    }

    /// The link addressing `block`.
    pub fn for_block(block: &[u8]) -> Self {
        Self {
            digest: Sha256::digest(block).into(),
        }
    }

    /// True if `block` hashes to this link.
    pub fn matches(&self, block: &[u8]) -> bool {
        Self::for_block(block) == *self
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.digest))
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", hex::encode(&self.digest[..6]))
    }
}

/// Failure to parse a [`Link`] from its hex form.
#[derive(Debug, Error)]
pub enum LinkParseError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected a 32 byte digest, got {0} bytes")]
    Length(usize),
}

impl FromStr for Link {
    type Err = LinkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let digest: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| LinkParseError::Length(bytes.len()))?;
        Ok(Self { digest })
    }
}

impl TryFrom<String> for Link {
    type Error = LinkParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Link> for String {
    fn from(link: Link) -> Self {
        link.to_string()
    }
}

// ─── Progress ─────────────────────────────────────────────────

/// The most recent block edge a traversal crossed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastBlock {
    pub path: Path,
    pub link: Link,
}

/// Where a pending item sits in the traversal.
///
/// Copied into each child and extended; never shared or edited afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub path: Path,
    /// `None` until the first link has been resolved.
    pub last_block: Option<LastBlock>,
}

impl Progress {
    /// Progress for a child reached through `segment`.
    pub fn descend(&self, segment: PathSegment) -> Self {
        Self {
            path: self.path.append(segment),
            last_block: self.last_block.clone(),
        }
    }

    /// Progress after loading `link` at the current path.
    pub fn crossed(&self, link: Link) -> Self {
        Self {
            path: self.path.clone(),
            last_block: Some(LastBlock {
                path: self.path.clone(),
                link,
            }),
        }
    }
}

// ─── Ordering / visit reason ──────────────────────────────────

/// Traversal discipline, fixed for the lifetime of one walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordering {
    #[default]
    DepthFirst,
    BreadthFirst,
}

/// Why the visitor is being called for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitReason {
    /// The selector declares the node a match.
    SelectionMatch,
    /// The node is only on the way to possible matches.
    SelectionCandidate,
}
