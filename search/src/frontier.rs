//! Frontier disciplines: FIFO (BFS), LIFO (DFS) and best-first (UCS, A*).
//!
//! Frontiers hold [`NodeId`]s only; the arena owns the nodes. Every frontier
//! tracks its size high-water mark for the `max_frontier` metric.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::node::{FrontierKey, NodeId};

/// Common frontier operations used by the expansion loop.
pub trait Frontier {
    /// Insert a node. FIFO and LIFO frontiers ignore the key.
    fn push(&mut self, key: FrontierKey, id: NodeId);

    /// Remove the next node to expand.
    fn pop(&mut self) -> Option<NodeId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest size ever reached.
    fn high_water(&self) -> u64;
}

fn bump(high_water: &mut u64, len: usize) {
    let size = len as u64;
    if size > *high_water {
        *high_water = size;
    }
}

/// First-in first-out queue.
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<NodeId>,
    high_water: u64,
}

impl FifoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for FifoFrontier {
    fn push(&mut self, _key: FrontierKey, id: NodeId) {
        self.queue.push_back(id);
        bump(&mut self.high_water, self.queue.len());
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }
}

/// Last-in first-out stack.
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<NodeId>,
    high_water: u64,
}

impl LifoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for LifoFrontier {
    fn push(&mut self, _key: FrontierKey, id: NodeId) {
        self.stack.push(id);
        bump(&mut self.high_water, self.stack.len());
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }
}

/// A frontier entry wrapping a node id with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<FrontierKey>` to get
/// min-heap behavior (lowest priority first).
#[derive(Debug)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    id: NodeId,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Priority queue ordered by [`FrontierKey`].
///
/// Duplicate entries for one state are allowed; the search loop discards the
/// stale ones on pop.
#[derive(Debug, Default)]
pub struct BestFirstFrontier {
    heap: BinaryHeap<FrontierEntry>,
    high_water: u64,
}

impl BestFirstFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the entry that would be popped next.
    #[must_use]
    pub fn peek_key(&self) -> Option<FrontierKey> {
        self.heap.peek().map(|e| e.key.0)
    }
}

impl Frontier for BestFirstFrontier {
    fn push(&mut self, key: FrontierKey, id: NodeId) {
        self.heap.push(FrontierEntry {
            key: Reverse(key),
            id,
        });
        bump(&mut self.high_water, self.heap.len());
    }

    fn pop(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|e| e.id)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn high_water(&self) -> u64 {
        self.high_water
    }
}
