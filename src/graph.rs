//! Compact undirected graph representation.
//!
//! The partitioning engine spends its time scanning neighbor lists, so the
//! graph is a plain symmetric adjacency structure: `adjacency[v]` holds the
//! sorted neighbors of `v`. Construction validates the input once (no
//! self-loops, endpoints in range, symmetric lists), and everything
//! downstream treats the graph as read-only.

use crate::error::{Error, Result};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Immutable undirected graph on vertices `0..n`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
}

impl Graph {
    /// Build a graph from an undirected edge list.
    ///
    /// Duplicate edges are collapsed; `(u, v)` and `(v, u)` are the same
    /// edge. Self-loops and out-of-range endpoints are rejected.
    pub fn from_edges(vertex_count: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut normalized = Vec::with_capacity(edges.len());
        for &(u, v) in edges {
            if u >= vertex_count {
                return Err(Error::VertexOutOfRange { vertex: u, vertex_count });
            }
            if v >= vertex_count {
                return Err(Error::VertexOutOfRange { vertex: v, vertex_count });
            }
            if u == v {
                return Err(Error::SelfLoop { vertex: u });
            }
            normalized.push(if u < v { (u, v) } else { (v, u) });
        }
        normalized.sort_unstable();
        normalized.dedup();

        let mut adjacency = vec![Vec::new(); vertex_count];
        for &(u, v) in &normalized {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        Ok(Self { adjacency, edge_count: normalized.len() })
    }

    /// Build a graph from pre-existing adjacency lists.
    ///
    /// Validates bounds, absence of self-loops, and symmetry: every entry
    /// `u ∈ adjacency[v]` must be mirrored by `v ∈ adjacency[u]`.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Result<Self> {
        let vertex_count = adjacency.len();
        let mut directed_entries = 0usize;
        for (v, neighbors) in adjacency.iter().enumerate() {
            for &u in neighbors {
                if u >= vertex_count {
                    return Err(Error::VertexOutOfRange { vertex: u, vertex_count });
                }
                if u == v {
                    return Err(Error::SelfLoop { vertex: v });
                }
                if !adjacency[u].contains(&v) {
                    return Err(Error::AsymmetricEdge { from: v, to: u });
                }
                directed_entries += 1;
            }
        }
        let mut adjacency = adjacency;
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }
        Ok(Self { adjacency, edge_count: directed_entries / 2 })
    }

    /// Project a petgraph undirected graph onto the compact representation.
    ///
    /// Node indices map to `0..node_count`; node and edge weights are
    /// ignored. Parallel edges collapse into one.
    pub fn from_ungraph<N, E>(graph: &UnGraph<N, E>) -> Result<Self> {
        let edges: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Self::from_edges(graph.node_count(), &edges)
    }

    /// Wrap adjacency lists already known to be symmetric, loop-free, and
    /// in range (projections of a validated graph). Lists must be sorted.
    pub(crate) fn from_symmetric_adjacency(adjacency: Vec<Vec<usize>>) -> Self {
        let directed_entries: usize = adjacency.iter().map(Vec::len).sum();
        Self { adjacency, edge_count: directed_entries / 2 }
    }

    /// Number of vertices N.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges M.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Neighbors of `v`, sorted ascending.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    /// Degree of `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// True when the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// A cluster projected onto its own vertex numbering.
///
/// `mapping[i]` is the parent-graph vertex that local vertex `i` stands for.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// The induced graph on `0..mapping.len()`.
    pub graph: Graph,
    /// Local-to-parent vertex mapping.
    pub mapping: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges_basic() {
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.degree(0), 1);
    }

    #[test]
    fn test_from_edges_dedup_and_orientation() {
        let g = Graph::from_edges(3, &[(0, 1), (1, 0), (0, 1)]).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0]);
    }

    #[test]
    fn test_from_edges_rejects_self_loop() {
        let err = Graph::from_edges(3, &[(1, 1)]).unwrap_err();
        assert_eq!(err, Error::SelfLoop { vertex: 1 });
    }

    #[test]
    fn test_from_edges_rejects_out_of_range() {
        let err = Graph::from_edges(2, &[(0, 5)]).unwrap_err();
        assert_eq!(err, Error::VertexOutOfRange { vertex: 5, vertex_count: 2 });
    }

    #[test]
    fn test_from_adjacency_rejects_asymmetry() {
        let err = Graph::from_adjacency(vec![vec![1], vec![]]).unwrap_err();
        assert_eq!(err, Error::AsymmetricEdge { from: 0, to: 1 });
    }

    #[test]
    fn test_from_adjacency_counts_edges_once() {
        let g = Graph::from_adjacency(vec![vec![1, 2], vec![0], vec![0]]).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_from_ungraph() {
        let mut pg = UnGraph::<(), ()>::new_undirected();
        let a = pg.add_node(());
        let b = pg.add_node(());
        let c = pg.add_node(());
        let _ = pg.add_edge(a, b, ());
        let _ = pg.add_edge(b, c, ());

        let g = Graph::from_ungraph(&pg).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::from_edges(0, &[]).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
    }
}
