//! Seeded random directed graphs with a guaranteed path to the goal.
//!
//! Every graph has a backbone `0 → 1 → … → n-1`, so the goal `n-1` is
//! reachable from every node, plus `extra_edges` random shortcuts. Edge costs
//! are whole numbers in `1..=9` so exact distances are exact in `f64`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use waymark_kernel::rng::{RngError, SeededRng};
use waymark_search::{SearchProblem, Successor};

/// Largest edge cost drawn.
pub const MAX_EDGE_COST: u64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    to: u32,
    cost: u64,
    /// Global insertion index, used as the action label.
    index: usize,
}

#[derive(Debug, Clone)]
pub struct RandomGraph {
    id: String,
    adjacency: Vec<Vec<Edge>>,
    /// Exact cost-to-goal of every node.
    distance: Vec<u64>,
    edge_count: usize,
}

impl RandomGraph {
    /// Draw a graph of `nodes` nodes (at least 2) from `rng`.
    ///
    /// The same seed and arguments always yield the same graph.
    ///
    /// # Errors
    ///
    /// Propagates [`RngError`] from sampling.
    pub fn generate(rng: &mut SeededRng, nodes: u32, extra_edges: u32) -> Result<Self, RngError> {
        let nodes = nodes.max(2);
        let id = format!("random-graph-{nodes}-{extra_edges}-seed-{}", rng.seed());
        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); nodes as usize];
        let mut edge_count = 0;

        for from in 0..nodes - 1 {
            let cost = rng.gen_range(1..MAX_EDGE_COST + 1)?;
            adjacency[from as usize].push(Edge {
                to: from + 1,
                cost,
                index: edge_count,
            });
            edge_count += 1;
        }
        for _ in 0..extra_edges {
            let from = draw_node(rng, nodes)?;
            let mut to = draw_node(rng, nodes - 1)?;
            if to >= from {
                to += 1;
            }
            let cost = rng.gen_range(1..MAX_EDGE_COST + 1)?;
            adjacency[from as usize].push(Edge {
                to,
                cost,
                index: edge_count,
            });
            edge_count += 1;
        }

        let distance = reverse_dijkstra(&adjacency, nodes - 1);
        Ok(Self {
            id,
            adjacency,
            distance,
            edge_count,
        })
    }

    #[must_use]
    pub fn nodes(&self) -> u32 {
        // Built from a `u32` node count.
        #[allow(clippy::cast_possible_truncation)]
        let n = self.adjacency.len() as u32;
        n
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[must_use]
    pub fn goal(&self) -> u32 {
        self.nodes() - 1
    }

    /// Exact remaining cost. Admissible and consistent.
    #[must_use]
    pub fn heuristic(&self, node: &u32) -> f64 {
        self.exact_distance(*node).unwrap_or(0.0)
    }

    /// Optimal cost from `node` to the goal, computed by reverse Dijkstra.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn exact_distance(&self, node: u32) -> Option<f64> {
        self.distance
            .get(node as usize)
            .filter(|&&d| d != u64::MAX)
            .map(|&d| d as f64)
    }

    /// Fewest edges from node 0 to the goal, by plain breadth-first traversal.
    #[must_use]
    pub fn fewest_edges_to_goal(&self) -> Option<usize> {
        let mut depth = vec![usize::MAX; self.adjacency.len()];
        let mut queue = std::collections::VecDeque::from([0usize]);
        depth[0] = 0;
        while let Some(u) = queue.pop_front() {
            for e in &self.adjacency[u] {
                let v = e.to as usize;
                if depth[v] == usize::MAX {
                    depth[v] = depth[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        depth.last().copied().filter(|&d| d != usize::MAX)
    }
}

fn draw_node(rng: &mut SeededRng, below: u32) -> Result<u32, RngError> {
    let n = rng.gen_range(0..u64::from(below))?;
    // `n < below <= u32::MAX`.
    #[allow(clippy::cast_possible_truncation)]
    let n = n as u32;
    Ok(n)
}

/// Distance from every node to `goal`; `u64::MAX` where unreachable.
fn reverse_dijkstra(adjacency: &[Vec<Edge>], goal: u32) -> Vec<u64> {
    let mut reverse: Vec<Vec<(usize, u64)>> = vec![Vec::new(); adjacency.len()];
    for (from, edges) in adjacency.iter().enumerate() {
        for e in edges {
            reverse[e.to as usize].push((from, e.cost));
        }
    }
    let mut dist = vec![u64::MAX; adjacency.len()];
    let mut heap = BinaryHeap::new();
    dist[goal as usize] = 0;
    heap.push(Reverse((0u64, goal as usize)));
    while let Some(Reverse((d, u))) = heap.pop() {
        if d > dist[u] {
            continue;
        }
        for &(v, c) in &reverse[u] {
            let nd = d + c;
            if nd < dist[v] {
                dist[v] = nd;
                heap.push(Reverse((nd, v)));
            }
        }
    }
    dist
}

impl SearchProblem for RandomGraph {
    type State = u32;
    /// Edge index in generation order.
    type Action = usize;

    fn problem_id(&self) -> &str {
        &self.id
    }

    fn start(&self) -> u32 {
        0
    }

    fn is_goal(&self, state: &u32) -> bool {
        *state == self.goal()
    }

    #[allow(clippy::cast_precision_loss)]
    fn successors(&self, state: &u32) -> Vec<Successor<u32, usize>> {
        self.adjacency
            .get(*state as usize)
            .map(|edges| {
                edges
                    .iter()
                    .map(|e| Successor::new(e.index, e.to, e.cost as f64))
                    .collect()
            })
            .unwrap_or_default()
    }
}
