//! Synthetic benchmark graphs with planted community structure.
//!
//! Two generators, both returning the graph together with its ground-truth
//! labels so recovered partitions can be scored with [`crate::metrics::nmi`]:
//!
//! - [`SbmConfig`]: the classical planted-partition model. Every vertex
//!   pair is an independent Bernoulli edge at probability `p_in` within a
//!   community and `p_out` across.
//! - [`LfrConfig`]: the LFR benchmark of Lancichinetti, Fortunato &
//!   Radicchi. Power-law degree and community-size distributions, with a
//!   mixing parameter `mu` controlling the fraction of each vertex's
//!   edges that leave its community. Closer to real networks, and much
//!   harder for partitioners than the homogeneous SBM.
//!
//! Generation is seeded, so a `(config, seed)` pair pins down the graph.

use rand::prelude::*;

use crate::error::Result;
use crate::graph::Graph;

/// A producer of benchmark graphs with known community assignments.
pub trait GraphSource: std::fmt::Debug {
    /// Generate a graph and its planted cluster labels from `seed`.
    fn generate(&self, seed: u64) -> Result<(Graph, Vec<usize>)>;
}

/// Classical stochastic block model configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SbmConfig {
    /// Number of vertices.
    pub n: usize,
    /// Number of planted communities.
    pub k: usize,
    /// Within-community edge probability.
    pub p_in: f64,
    /// Between-community edge probability.
    pub p_out: f64,
}

impl GraphSource for SbmConfig {
    fn generate(&self, seed: u64) -> Result<(Graph, Vec<usize>)> {
        let k = self.k.max(1);
        let labels: Vec<usize> = (0..self.n).map(|i| i % k).collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = Vec::new();
        for u in 0..self.n {
            for v in (u + 1)..self.n {
                let p = if labels[u] == labels[v] { self.p_in } else { self.p_out };
                if rng.random_range(0.0..1.0) < p {
                    edges.push((u, v));
                }
            }
        }

        Ok((Graph::from_edges(self.n, &edges)?, labels))
    }
}

/// LFR benchmark configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LfrConfig {
    /// Number of vertices.
    pub n: usize,
    /// Degree distribution exponent (τ1).
    pub tau1: f64,
    /// Community size distribution exponent (τ2).
    pub tau2: f64,
    /// Mixing parameter: fraction of each vertex's edges leaving its
    /// community.
    pub mu: f64,
    /// Target average degree.
    pub avg_degree: usize,
    /// Minimum community size.
    pub min_comm_size: usize,
}

/// Inverse-CDF sample from a power law with exponent `tau` and lower
/// bound `xmin`.
fn sample_powerlaw(xmin: f64, tau: f64, rng: &mut StdRng) -> usize {
    let r: f64 = rng.random_range(0.0..1.0);
    (xmin * (1.0 - r).powf(-1.0 / (tau - 1.0))) as usize
}

impl GraphSource for LfrConfig {
    fn generate(&self, seed: u64) -> Result<(Graph, Vec<usize>)> {
        let n = self.n;
        let mut rng = StdRng::seed_from_u64(seed);

        // Power-law degree sequence, rescaled to the target average.
        let mut degrees: Vec<usize> =
            (0..n).map(|_| sample_powerlaw(1.0, self.tau1, &mut rng).max(1)).collect();
        let mean: f64 = degrees.iter().sum::<usize>() as f64 / n.max(1) as f64;
        let scale = self.avg_degree as f64 / mean;
        for degree in &mut degrees {
            *degree = ((*degree as f64 * scale) as usize).max(1);
        }

        // Power-law community sizes covering all vertices; the last
        // community shrinks to absorb the overshoot.
        let mut community_sizes: Vec<usize> = Vec::new();
        let mut total = 0;
        while total < n {
            let size = sample_powerlaw(self.min_comm_size as f64, self.tau2, &mut rng)
                .max(self.min_comm_size);
            community_sizes.push(size);
            total += size;
        }
        if let Some(last) = community_sizes.last_mut() {
            *last -= total - n;
        }

        let mut labels = vec![0usize; n];
        let mut vertex = 0;
        for (community, &size) in community_sizes.iter().enumerate() {
            for _ in 0..size {
                labels[vertex] = community;
                vertex += 1;
            }
        }

        // Split each vertex's degree into internal and external stubs.
        let mut internal_stubs: Vec<Vec<usize>> = vec![Vec::new(); community_sizes.len()];
        let mut external_stubs: Vec<usize> = Vec::new();
        for v in 0..n {
            let internal = ((1.0 - self.mu) * degrees[v] as f64) as usize;
            let external = degrees[v] - internal;
            internal_stubs[labels[v]].extend(std::iter::repeat(v).take(internal));
            external_stubs.extend(std::iter::repeat(v).take(external));
        }

        // Wire internal edges within each community by stub matching.
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for stubs in &mut internal_stubs {
            stubs.shuffle(&mut rng);
            for pair in stubs.chunks_exact(2) {
                if pair[0] != pair[1] {
                    edges.push((pair[0], pair[1]));
                }
            }
        }

        // Wire external edges across communities.
        external_stubs.shuffle(&mut rng);
        for pair in external_stubs.chunks_exact(2) {
            if pair[0] != pair[1] && labels[pair[0]] != labels[pair[1]] {
                edges.push((pair[0], pair[1]));
            }
        }

        // Duplicate stub pairings collapse during construction.
        Ok((Graph::from_edges(n, &edges)?, labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbm_labels_and_shape() {
        let config = SbmConfig { n: 30, k: 3, p_in: 0.5, p_out: 0.05 };
        let (graph, labels) = config.generate(1).unwrap();

        assert_eq!(graph.vertex_count(), 30);
        assert_eq!(labels.len(), 30);
        assert_eq!(labels[0], 0);
        assert_eq!(labels[4], 1);
        assert!(labels.iter().all(|&c| c < 3));
    }

    #[test]
    fn test_sbm_is_seeded() {
        let config = SbmConfig { n: 20, k: 2, p_in: 0.4, p_out: 0.1 };
        let (g1, _) = config.generate(7).unwrap();
        let (g2, _) = config.generate(7).unwrap();
        let (g3, _) = config.generate(8).unwrap();

        assert_eq!(g1.edge_count(), g2.edge_count());
        for v in 0..20 {
            assert_eq!(g1.neighbors(v), g2.neighbors(v));
        }
        // A different seed should draw a different edge set.
        let same = (0..20).all(|v| g1.neighbors(v) == g3.neighbors(v));
        assert!(!same);
    }

    #[test]
    fn test_sbm_extreme_probabilities() {
        let config = SbmConfig { n: 12, k: 3, p_in: 1.0, p_out: 0.0 };
        let (graph, labels) = config.generate(0).unwrap();

        // Disjoint cliques: all edges internal, each vertex sees its
        // whole community.
        for v in 0..12 {
            assert_eq!(graph.degree(v), 3);
            for &w in graph.neighbors(v) {
                assert_eq!(labels[v], labels[w]);
            }
        }
    }

    #[test]
    fn test_lfr_covers_all_vertices() {
        let config = LfrConfig {
            n: 120,
            tau1: 2.5,
            tau2: 1.8,
            mu: 0.2,
            avg_degree: 8,
            min_comm_size: 10,
        };
        let (graph, labels) = config.generate(3).unwrap();

        assert_eq!(graph.vertex_count(), 120);
        assert_eq!(labels.len(), 120);

        let communities = labels.iter().copied().max().unwrap() + 1;
        let mut sizes = vec![0usize; communities];
        for &c in &labels {
            sizes[c] += 1;
        }
        assert_eq!(sizes.iter().sum::<usize>(), 120);
        assert!(sizes.iter().all(|&s| s > 0));
        // All but the overshoot-absorbing last community honor the floor.
        assert!(sizes[..communities - 1].iter().all(|&s| s >= 10));
    }

    #[test]
    fn test_lfr_zero_mixing_keeps_edges_internal() {
        let config = LfrConfig {
            n: 80,
            tau1: 2.5,
            tau2: 2.0,
            mu: 0.0,
            avg_degree: 6,
            min_comm_size: 8,
        };
        let (graph, labels) = config.generate(5).unwrap();

        for v in 0..80 {
            for &w in graph.neighbors(v) {
                assert_eq!(labels[v], labels[w], "edge {v}-{w} crosses communities");
            }
        }
    }
}
