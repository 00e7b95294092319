//! Top-down divisive partitioning.
//!
//! Starts from the trivial one-cluster partition and grows the cluster
//! count one split at a time:
//!
//! 1. Project every current cluster onto its own subgraph.
//! 2. For each cluster of at least two vertices, search for the best
//!    binary split with the connectivity snowball heuristic and score it
//!    against the cluster's unsplit description length.
//! 3. Install the single best candidate across all clusters (part 1 of
//!    the winning split becomes a brand-new cluster), then refine the
//!    whole partition with MCMC.
//!
//! A split is admitted even when slightly worse than the status quo
//! (`h_after < h_before + τ·|h_before|`): marginal splits often pay off
//! after refinement, and the global candidate selection still prefers
//! genuinely improving ones. The loop ends at the target count or as soon
//! as no cluster admits a tolerable split.
//!
//! ## Snowball splits
//!
//! A proposal seeds two parts with two random vertices, then visits the
//! remaining vertices in random order, assigning each to the part holding
//! the majority of its already-assigned neighbors (ties random). Growing
//! regions along edges this way keeps both parts internally connected in
//! practice, which is exactly what a good block split looks like on
//! assortative graphs. The best of `P` independent proposals (scored by
//! H of the induced 2-cluster model) wins.

use log::debug;
use rand::prelude::*;
use rayon::prelude::*;

use super::{check_target, Partitioner};
use crate::blockmodel::{BlockModel, NULL_CLUSTER};
use crate::error::Result;
use crate::graph::Graph;
use crate::mcmc;
use crate::mdl::compute_h;
use crate::params::{DEFAULT_PROPOSALS_PER_SPLIT, MCMC_REFINEMENT_MULTIPLIER, SPLIT_TOLERANCE};
use crate::rng::{derive_seed, task_rng};

/// Top-down divisive partitioner.
#[derive(Debug, Clone)]
pub struct TopDown {
    /// Target cluster count K*.
    target_clusters: usize,
    /// Snowball proposals evaluated per cluster and round.
    proposals_per_split: usize,
    /// Base random seed.
    seed: Option<u64>,
}

impl TopDown {
    /// Create a top-down partitioner aiming for `target_clusters`.
    pub fn new(target_clusters: usize) -> Self {
        Self {
            target_clusters,
            proposals_per_split: DEFAULT_PROPOSALS_PER_SPLIT,
            seed: None,
        }
    }

    /// Set the number of snowball proposals per candidate split.
    pub fn with_proposals(mut self, proposals_per_split: usize) -> Self {
        self.proposals_per_split = proposals_per_split.max(1);
        self
    }

    /// Set the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

struct SplitCandidate {
    delta: f64,
    cluster: usize,
    assignment: Vec<usize>,
}

impl Partitioner for TopDown {
    fn partition<'g>(&self, graph: &'g Graph) -> Result<BlockModel<'g>> {
        check_target(self.target_clusters)?;
        if graph.is_empty() {
            return Ok(BlockModel::new(graph, 0));
        }

        let n = graph.vertex_count();
        let mut model = BlockModel::unified(graph);
        let mut round: u64 = 0;

        while model.cluster_count() < self.target_clusters {
            let subgraphs = model.cluster_subgraphs();

            let mut candidates: Vec<SplitCandidate> = Vec::new();
            for (cluster, sub) in subgraphs.iter().enumerate() {
                if sub.graph.vertex_count() < 2 {
                    continue;
                }

                let h_before = compute_h(&BlockModel::unified(&sub.graph));
                let split_seed = derive_seed(self.seed, (round << 20) ^ cluster as u64);
                let (assignment, h_after) =
                    snowball_split(&sub.graph, self.proposals_per_split, split_seed);

                if h_after < h_before + SPLIT_TOLERANCE * h_before.abs() {
                    candidates.push(SplitCandidate {
                        delta: h_after - h_before,
                        cluster,
                        assignment,
                    });
                }
            }

            let Some(best) = candidates.into_iter().min_by(|a, b| a.delta.total_cmp(&b.delta))
            else {
                debug!("top-down: no admissible split at K={}", model.cluster_count());
                break;
            };

            let new_cluster = model.cluster_count();
            debug!(
                "top-down: splitting cluster {} (ΔH={:.4}), K -> {}",
                best.cluster,
                best.delta,
                new_cluster + 1
            );

            model.resize_clusters(new_cluster + 1);
            let mapping = &subgraphs[best.cluster].mapping;
            for (local, &part) in best.assignment.iter().enumerate() {
                if part == 1 {
                    model.assignment_mut()[mapping[local]] = new_cluster;
                }
            }
            model.update_matrix();

            mcmc::refine(
                &mut model,
                MCMC_REFINEMENT_MULTIPLIER * n,
                derive_seed(self.seed, (round << 20) ^ 0x5bd1),
            );
            round += 1;
        }

        Ok(model)
    }
}

/// Best binary split of `graph` over `proposals` snowball attempts.
///
/// Returns the winning part assignment (`0`/`1` per vertex) and its
/// 2-cluster description length. Graphs with fewer than two vertices come
/// back unsplit with their 1-cluster score.
fn snowball_split(graph: &Graph, proposals: usize, seed: Option<u64>) -> (Vec<usize>, f64) {
    let n = graph.vertex_count();
    if n < 2 {
        return (vec![0; n], compute_h(&BlockModel::unified(graph)));
    }

    (0..proposals.max(1))
        .into_par_iter()
        .map(|proposal| {
            let mut rng = task_rng(seed, proposal as u64);
            let assignment = snowball_proposal(graph, &mut rng);

            let mut bm = BlockModel::new(graph, 2);
            bm.assignment_mut().copy_from_slice(&assignment);
            bm.update_matrix();
            (assignment, compute_h(&bm))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .expect("at least one snowball proposal")
}

/// One snowball bipartition: grow two seed regions by majority vote.
fn snowball_proposal(graph: &Graph, rng: &mut impl Rng) -> Vec<usize> {
    let n = graph.vertex_count();
    let mut assignment = vec![NULL_CLUSTER; n];

    let seed0 = rng.random_range(0..n);
    let mut seed1 = rng.random_range(0..n);
    while seed1 == seed0 {
        seed1 = rng.random_range(0..n);
    }
    assignment[seed0] = 0;
    assignment[seed1] = 1;

    let mut unassigned: Vec<usize> = (0..n).filter(|&v| v != seed0 && v != seed1).collect();
    unassigned.shuffle(rng);

    for v in unassigned {
        let mut votes = [0usize; 2];
        for &w in graph.neighbors(v) {
            match assignment[w] {
                0 => votes[0] += 1,
                1 => votes[1] += 1,
                _ => {}
            }
        }
        assignment[v] = match votes[0].cmp(&votes[1]) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Less => 1,
            std::cmp::Ordering::Equal => rng.random_range(0..2),
        };
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cliques_graph() -> Graph {
        Graph::from_edges(
            8,
            &[
                (0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3),
                (4, 5), (4, 6), (4, 7), (5, 6), (5, 7), (6, 7),
                (3, 4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_splits_two_cliques() {
        let g = two_cliques_graph();
        let model = TopDown::new(2).with_seed(21).partition(&g).unwrap();

        assert_eq!(model.cluster_count(), 2);
        model.validate().unwrap();

        let a = model.assignment();
        for clique in [&a[..4], &a[4..]] {
            assert!(clique.iter().all(|&c| c == clique[0]), "clique split: {a:?}");
        }
        assert_ne!(a[0], a[4]);
    }

    #[test]
    fn test_target_one_returns_unified() {
        let g = two_cliques_graph();
        let model = TopDown::new(1).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 1);
        assert!(model.assignment().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_rejects_zero_target() {
        let g = two_cliques_graph();
        assert!(TopDown::new(0).partition(&g).is_err());
    }

    #[test]
    fn test_empty_graph_yields_zero_clusters() {
        let g = Graph::from_edges(0, &[]).unwrap();
        let model = TopDown::new(3).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 0);
    }

    #[test]
    fn test_single_vertex_stalls_at_one() {
        let g = Graph::from_edges(1, &[]).unwrap();
        let model = TopDown::new(4).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 1);
        assert_eq!(model.assignment(), &[0]);
    }

    #[test]
    fn test_edgeless_graph_never_splits() {
        // Splitting an edgeless cluster only buys model complexity, which
        // the tolerance never admits.
        let g = Graph::from_edges(10, &[]).unwrap();
        let model = TopDown::new(3).with_seed(4).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 1);
    }

    #[test]
    fn test_snowball_parts_are_nonempty() {
        let g = two_cliques_graph();
        let (assignment, _) = snowball_split(&g, 8, Some(6));
        assert!(assignment.contains(&0));
        assert!(assignment.contains(&1));
        assert!(assignment.iter().all(|&p| p < 2));
    }
}
