// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shortest-path search over the context graph.
//!
//! ## Algorithm
//!
//! Dijkstra with a plain selection loop instead of a priority queue: context
//! graphs are small and change rarely, and a linear scan keeps every choice
//! deterministic.
//!
//! - Nodes are live contexts in registration order; edges are visited per node
//!   in registration order.
//! - The next node to settle is the unsettled node with the lowest distance;
//!   equal distances settle in registration order.
//! - Self-loops and edges touching removed contexts are skipped.
//! - Parallel edges are relaxed one by one, so the cheapest wins.
//!
//! ## Ties
//!
//! When a relaxation reaches a node at exactly its current distance:
//! - from the same predecessor (a parallel edge), the earlier registered edge is kept;
//! - from a different predecessor, the route through the later settled predecessor wins.
//!
//! Both rules depend only on registration order, never on hash iteration order.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::types::{ContextId, NavigationEdge};

/// Read-only adjacency view built for a single search.
pub(crate) struct Graph<'a> {
    nodes: &'a [ContextId],
    edges: &'a [NavigationEdge],
    // Per node: (edge index, destination node) in edge registration order.
    adjacency: Vec<Vec<(usize, usize)>>,
    index: HashMap<&'a str, usize>,
}

/// Result of a successful search.
#[derive(Debug)]
pub(crate) struct Route {
    /// Node index of the reached target.
    pub(crate) target: usize,
    /// Edge indices from origin to target.
    pub(crate) edges: Vec<usize>,
    pub(crate) total_weight: f64,
}

impl<'a> Graph<'a> {
    pub(crate) fn new(nodes: &'a [ContextId], edges: &'a [NavigationEdge]) -> Self {
        let index: HashMap<&'a str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (ei, edge) in edges.iter().enumerate() {
            let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
            else {
                continue;
            };
            if from == to {
                continue;
            }
            adjacency[from].push((ei, to));
        }
        Self {
            nodes,
            edges,
            adjacency,
            index,
        }
    }

    /// Node index of a live context.
    pub(crate) fn node(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn id(&self, node: usize) -> &'a ContextId {
        &self.nodes[node]
    }

    /// Cheapest route from `origin` to the first node accepted by `is_target`.
    ///
    /// Targets are tested as nodes settle, so the nearest target wins and equal
    /// distances go to the earlier registered context.
    pub(crate) fn search(&self, origin: usize, is_target: impl Fn(usize) -> bool) -> Option<Route> {
        let n = self.nodes.len();
        let mut dist = vec![f64::INFINITY; n];
        // (edge index, predecessor node)
        let mut via: Vec<Option<(usize, usize)>> = vec![None; n];
        let mut settled = vec![false; n];
        dist[origin] = 0.0;

        loop {
            let mut next: Option<usize> = None;
            for i in 0..n {
                if settled[i] || !dist[i].is_finite() {
                    continue;
                }
                if next.is_none_or(|j| dist[i] < dist[j]) {
                    next = Some(i);
                }
            }
            let u = next?;
            settled[u] = true;

            if is_target(u) {
                return Some(self.reconstruct(u, &via, dist[u]));
            }

            for &(ei, v) in &self.adjacency[u] {
                if settled[v] {
                    continue;
                }
                let candidate = dist[u] + self.edges[ei].weight;
                let better = candidate < dist[v]
                    || (candidate == dist[v] && via[v].is_some_and(|(_, p)| p != u));
                if better {
                    dist[v] = candidate;
                    via[v] = Some((ei, u));
                }
            }
        }
    }

    fn reconstruct(&self, target: usize, via: &[Option<(usize, usize)>], total_weight: f64) -> Route {
        let mut edges = Vec::new();
        let mut cur = target;
        // Predecessors always settle before their successors, so this terminates.
        while let Some((ei, pred)) = via[cur] {
            edges.push(ei);
            cur = pred;
        }
        edges.reverse();
        Route {
            target,
            edges,
            total_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ids(names: &[&str]) -> Vec<ContextId> {
        names.iter().map(|n| ContextId::from(*n)).collect()
    }

    fn edge(from: &str, to: &str, tool: &str, weight: f64) -> NavigationEdge {
        NavigationEdge {
            from: from.into(),
            to: to.into(),
            tool: tool.into(),
            weight,
        }
    }

    fn tools<'e>(graph_edges: &'e [NavigationEdge], route: &Route) -> Vec<&'e str> {
        route
            .edges
            .iter()
            .map(|&ei| graph_edges[ei].tool.as_str())
            .collect()
    }

    #[test]
    fn origin_is_zero_step() {
        let nodes = ids(&["a", "b"]);
        let edges = vec![edge("a", "b", "t1", 1.0)];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 0).unwrap();
        assert!(route.edges.is_empty());
        assert_eq!(route.total_weight, 0.0);
    }

    #[test]
    fn cheaper_detour_beats_expensive_direct() {
        let nodes = ids(&["a", "b", "c"]);
        let edges = vec![
            edge("a", "b", "t1", 5.0),
            edge("a", "c", "t2", 1.0),
            edge("c", "b", "t3", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 1).unwrap();
        assert_eq!(tools(&edges, &route), ["t2", "t3"]);
        assert_eq!(route.total_weight, 2.0);
    }

    #[test]
    fn equal_weight_prefers_later_settled_predecessor() {
        let nodes = ids(&["a", "b", "c"]);
        let edges = vec![
            edge("a", "b", "t1", 2.0),
            edge("a", "c", "t2", 1.0),
            edge("c", "b", "t3", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 1).unwrap();
        assert_eq!(tools(&edges, &route), ["t2", "t3"]);
        assert_eq!(route.total_weight, 2.0);
    }

    #[test]
    fn diamond_tie_goes_through_later_settled_branch() {
        // x and y tie at 1; x settles first (registered first), so y relaxes b last.
        let nodes = ids(&["a", "x", "y", "b"]);
        let edges = vec![
            edge("a", "x", "to-x", 1.0),
            edge("a", "y", "to-y", 1.0),
            edge("x", "b", "x-to-b", 1.0),
            edge("y", "b", "y-to-b", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 3).unwrap();
        assert_eq!(tools(&edges, &route), ["to-y", "y-to-b"]);
        assert_eq!(route.total_weight, 2.0);
    }

    #[test]
    fn parallel_edges_keep_cheaper_then_earlier() {
        let nodes = ids(&["a", "b"]);
        let edges = vec![
            edge("a", "b", "t1", 3.0),
            edge("a", "b", "t2", 1.0),
            edge("a", "b", "t3", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 1).unwrap();
        assert_eq!(tools(&edges, &route), ["t2"]);
    }

    #[test]
    fn self_loops_and_dangling_edges_are_ignored() {
        let nodes = ids(&["a", "b"]);
        let edges = vec![
            edge("a", "a", "t1", 0.5),
            edge("a", "gone", "t2", 1.0),
            edge("gone", "b", "t3", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        assert!(g.search(0, |n| n == 1).is_none());
    }

    #[test]
    fn nearest_of_several_targets() {
        let nodes = ids(&["a", "far", "near"]);
        let edges = vec![edge("a", "far", "t1", 4.0), edge("a", "near", "t2", 2.0)];
        let g = Graph::new(&nodes, &edges);
        let route = g.search(0, |n| n == 1 || n == 2).unwrap();
        assert_eq!(route.target, 2);
        assert_eq!(g.id(route.target).as_str(), "near");
    }

    #[test]
    fn cycles_terminate() {
        let nodes = ids(&["a", "b", "c", "d"]);
        let edges = vec![
            edge("a", "b", "t1", 1.0),
            edge("b", "a", "t2", 1.0),
            edge("b", "c", "t3", 1.0),
            edge("c", "a", "t4", 1.0),
        ];
        let g = Graph::new(&nodes, &edges);
        assert!(g.search(0, |n| n == 3).is_none());
        let route = g.search(0, |n| n == 2).unwrap();
        assert_eq!(tools(&edges, &route), ["t1", "t3"]);
    }
}
