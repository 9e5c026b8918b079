//! Pending-work queue honoring the walk's ordering.
//!
//! Breadth-first appends batches at the tail and takes from the head.
//! Depth-first reverses each batch before appending and takes from the tail,
//! so the first item of the newest batch comes out next and older siblings
//! wait underneath the deeper work.

use std::collections::VecDeque;

use crate::error::QueueError;
use crate::types::Ordering;

const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Ordered multiset of pending items.
#[derive(Debug, Clone)]
pub struct OrderedQueue<T> {
    ordering: Ordering,
    items: VecDeque<T>,
}

impl<T> OrderedQueue<T> {
    pub fn new(ordering: Ordering) -> Self {
        Self {
            ordering,
            items: VecDeque::with_capacity(DEFAULT_QUEUE_CAPACITY),
        }
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    /// Add a batch of items produced together, in their natural order.
    pub fn enqueue<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: DoubleEndedIterator,
    {
        match self.ordering {
            Ordering::DepthFirst => self.items.extend(batch.into_iter().rev()),
            Ordering::BreadthFirst => self.items.extend(batch),
        }
    }

    /// Take the next item. Fails with [`QueueError::Empty`] when nothing is left.
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        let next = match self.ordering {
            Ordering::DepthFirst => self.items.pop_back(),
            Ordering::BreadthFirst => self.items.pop_front(),
        };
        next.ok_or(QueueError::Empty)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
