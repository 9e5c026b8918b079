//! Shared fixtures: JSON blocks with `{"/": "<hex digest>"}` links, a few
//! selectors and a recording visitor.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use ipld_walker::node::{Entries, SinglePrototype};
use ipld_walker::{
    Kind, Link, MemoryBlockStore, Node, NodeError, NodePrototype, NodePrototypeChooser, NodeRef,
    PathSegment, Progress, Selector, SelectorRef, Visitor, VisitReason,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, Once};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ─── JSON node model ──────────────────────────────────────────

#[derive(Debug)]
pub enum JsonNode {
    Scalar(Value),
    Map(Vec<(String, NodeRef)>),
    List(Vec<NodeRef>),
    Link(Link),
}

impl JsonNode {
    pub fn from_value(value: Value) -> Result<NodeRef> {
        let node = match value {
            Value::Object(obj) => {
                if obj.len() == 1 {
                    if let Some(Value::String(hex)) = obj.get("/") {
                        return Ok(Arc::new(JsonNode::Link(hex.parse()?)));
                    }
                }
                let mut entries = Vec::with_capacity(obj.len());
                for (k, v) in obj {
                    entries.push((k, Self::from_value(v)?));
                }
                JsonNode::Map(entries)
            }
            Value::Array(items) => JsonNode::List(
                items
                    .into_iter()
                    .map(Self::from_value)
                    .collect::<Result<_>>()?,
            ),
            scalar => JsonNode::Scalar(scalar),
        };
        Ok(Arc::new(node))
    }
}

impl Node for JsonNode {
    fn kind(&self) -> Kind {
        match self {
            JsonNode::Scalar(Value::Null) => Kind::Null,
            JsonNode::Scalar(Value::Bool(_)) => Kind::Bool,
            JsonNode::Scalar(Value::Number(n)) if n.is_i64() || n.is_u64() => Kind::Int,
            JsonNode::Scalar(Value::Number(_)) => Kind::Float,
            JsonNode::Scalar(_) => Kind::String,
            JsonNode::Map(_) => Kind::Map,
            JsonNode::List(_) => Kind::List,
            JsonNode::Link(_) => Kind::Link,
        }
    }

    fn lookup_by_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError> {
        let found = match self {
            JsonNode::Map(entries) => segment.as_key().and_then(|key| {
                entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            }),
            JsonNode::List(items) => segment
                .as_index()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| items.get(i).cloned()),
            _ => None,
        };
        found.ok_or_else(|| NodeError::NotFound {
            segment: segment.clone(),
        })
    }

    fn entries(&self) -> Entries<'_> {
        match self {
            JsonNode::Map(entries) => Box::new(
                entries
                    .iter()
                    .map(|(k, v)| Ok((PathSegment::from(k.as_str()), v.clone()))),
            ),
            JsonNode::List(items) => Box::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Ok((PathSegment::Index(i as i64), v.clone()))),
            ),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn as_link(&self) -> Result<Link, NodeError> {
        match self {
            JsonNode::Link(link) => Ok(*link),
            other => Err(NodeError::WrongKind {
                expected: "link",
                actual: other.kind().name(),
            }),
        }
    }

    fn len(&self) -> usize {
        match self {
            JsonNode::Map(entries) => entries.len(),
            JsonNode::List(items) => items.len(),
            _ => 0,
        }
    }
}

pub struct JsonPrototype;

impl NodePrototype for JsonPrototype {
    fn build(&self, _link: &Link, block: &[u8]) -> Result<NodeRef> {
        let value: Value = serde_json::from_slice(block)?;
        JsonNode::from_value(value)
    }
}

pub fn json_chooser() -> Arc<dyn NodePrototypeChooser> {
    Arc::new(SinglePrototype(Arc::new(JsonPrototype)))
}

/// Store `value` as a JSON block.
pub fn put_json(store: &MemoryBlockStore, value: &Value) -> Link {
    let block = serde_json::to_vec(value).unwrap_or_default();
    store.put(block)
}

/// `{"/": "<hex>"}` for embedding a link in a JSON block.
pub fn link_value(link: &Link) -> Value {
    serde_json::json!({ "/": link.to_string() })
}

pub fn root_from(value: Value) -> NodeRef {
    JsonNode::from_value(value).unwrap()
}

pub fn bytes_of(store: &MemoryBlockStore, link: &Link) -> Result<Vec<u8>> {
    store
        .get(link)
        .ok_or_else(|| anyhow!("missing block {link}"))
}

// ─── Selectors ────────────────────────────────────────────────

/// Matches and explores everything, to an optional depth.
#[derive(Debug, Clone)]
pub struct Recursive {
    pub remaining: Option<usize>,
}

impl Recursive {
    pub fn unbounded() -> SelectorRef {
        Arc::new(Self { remaining: None })
    }

    pub fn depth(limit: usize) -> SelectorRef {
        Arc::new(Self {
            remaining: Some(limit),
        })
    }
}

impl Selector for Recursive {
    fn interests(&self) -> Option<Vec<PathSegment>> {
        None
    }

    fn explore(&self, _node: &dyn Node, _segment: &PathSegment) -> Option<SelectorRef> {
        match self.remaining {
            None => Some(Arc::new(self.clone())),
            Some(0) => None,
            Some(n) => Some(Arc::new(Recursive {
                remaining: Some(n - 1),
            })),
        }
    }

    fn decide(&self, _node: &dyn Node) -> bool {
        true
    }
}

/// Follows only the named fields, each under its own selector.
#[derive(Debug)]
pub struct Fields(pub Vec<(PathSegment, SelectorRef)>);

impl Fields {
    pub fn of(fields: Vec<(&str, SelectorRef)>) -> SelectorRef {
        Arc::new(Fields(
            fields
                .into_iter()
                .map(|(k, s)| (PathSegment::from(k), s))
                .collect(),
        ))
    }
}

impl Selector for Fields {
    fn interests(&self) -> Option<Vec<PathSegment>> {
        Some(self.0.iter().map(|(s, _)| s.clone()).collect())
    }

    fn explore(&self, _node: &dyn Node, segment: &PathSegment) -> Option<SelectorRef> {
        self.0
            .iter()
            .find(|(s, _)| s == segment)
            .map(|(_, next)| next.clone())
    }

    fn decide(&self, _node: &dyn Node) -> bool {
        false
    }
}

// ─── Visitor ──────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Visit {
    pub path: String,
    pub kind: Kind,
    pub reason: VisitReason,
    pub last_block: Option<Link>,
}

#[derive(Clone, Default)]
pub struct Recorder {
    visits: Arc<Mutex<Vec<Visit>>>,
    fail_at: Option<String>,
}

impl Recorder {
    pub fn failing_at(path: &str) -> Self {
        Self {
            visits: Arc::default(),
            fail_at: Some(path.to_string()),
        }
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.visits().into_iter().map(|v| v.path).collect()
    }
}

impl Visitor for Recorder {
    fn visit(&mut self, progress: &Progress, node: &NodeRef, reason: VisitReason) -> Result<()> {
        let path = progress.path.to_string();
        if self.fail_at.as_deref() == Some(path.as_str()) {
            bail!("visitor rejected {path}");
        }
        self.visits
            .lock()
            .map_err(|_| anyhow!("recorder poisoned"))?
            .push(Visit {
                path,
                kind: node.kind(),
                reason,
                last_block: progress.last_block.as_ref().map(|b| b.link),
            });
        Ok(())
    }
}
