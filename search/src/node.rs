//! Search nodes, the node arena, and the frontier ordering key.
//!
//! Parents are arena indices, not references: a node never owns its parent
//! and path reconstruction is a walk over `NodeId`s.

/// Index of a node in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node created during search.
#[derive(Debug, Clone)]
pub struct SearchNode<S, A> {
    pub state: S,
    /// Accumulated path cost from the start.
    pub g: f64,
    /// Edges from the start (root = 0).
    pub depth: u32,
    /// Back-reference used only for path reconstruction.
    pub parent: Option<NodeId>,
    /// The action that produced this node from its parent.
    pub action: Option<A>,
    /// Strictly increasing insertion counter; breaks exact priority ties.
    pub insertion_order: u64,
}

/// Append-only store of every node created in one search call.
#[derive(Debug)]
pub struct NodeArena<S, A> {
    nodes: Vec<SearchNode<S, A>>,
}

impl<S: Clone, A: Clone> NodeArena<S, A> {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert the start node.
    pub fn push_root(&mut self, state: S) -> NodeId {
        self.insert(state, 0.0, 0, None, None)
    }

    /// Insert a child of `parent` reached via `action` at accumulated cost `g`.
    pub fn push_child(&mut self, parent: NodeId, action: A, state: S, g: f64) -> NodeId {
        let depth = self.get(parent).depth.saturating_add(1);
        self.insert(state, g, depth, Some(parent), Some(action))
    }

    fn insert(
        &mut self,
        state: S,
        g: f64,
        depth: u32,
        parent: Option<NodeId>,
        action: Option<A>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode {
            state,
            g,
            depth,
            parent,
            action,
            insertion_order: id.0 as u64,
        });
        id
    }

    /// Look up a node. Ids are only ever handed out by this arena.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode<S, A> {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// States and actions from the root to `id`, in forward order.
    ///
    /// `actions.len() == states.len() - 1`.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> (Vec<S>, Vec<A>) {
        let mut states = Vec::new();
        let mut actions = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.get(cur);
            states.push(node.state.clone());
            if let Some(action) = &node.action {
                actions.push(action.clone());
            }
            current = node.parent;
        }
        states.reverse();
        actions.reverse();
        (states, actions)
    }
}

impl<S: Clone, A: Clone> Default for NodeArena<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

/// The frontier ordering key: `(priority, insertion_order)`.
///
/// Lower priority first; exact ties go to the older insertion. Priorities are
/// compared with [`f64::total_cmp`], so the order is total even for values the
/// engine would never produce.
#[derive(Debug, Clone, Copy)]
pub struct FrontierKey {
    pub priority: f64,
    pub insertion_order: u64,
}

impl PartialEq for FrontierKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FrontierKey {}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.insertion_order.cmp(&other.insertion_order))
    }
}
