//! Bottom-up agglomerative partitioning.
//!
//! Starts from the finest partition (one cluster per vertex) and merges
//! its way down to the target count. Each outer round:
//!
//! 1. **Propose.** In parallel, every non-empty cluster finds its best
//!    merge partner among the clusters it shares edges with, scored by
//!    the analytic merge delta. Only improving merges (Δ < 0) survive.
//! 2. **Force.** If nothing improves but the target has not been reached,
//!    the single least-bad pair over all non-empty cluster pairs (edge
//!    or no edge) is merged anyway. The refinement pass after a forced
//!    round runs longer to absorb the transient damage.
//! 3. **Batch.** Proposals are sorted by ascending Δ and accepted
//!    greedily while their endpoints are untouched, capped so the batch
//!    never overshoots the target. Conflicting merges simply wait for the
//!    next round; the greedy independent set is what makes batched
//!    merging safe without locks.
//! 4. **Apply.** Accepted merges rewrite the assignment, ids are
//!    re-compacted, the block matrix is rebuilt, and once the cluster
//!    count is small enough for it to matter, MCMC refinement runs with
//!    an iteration budget scaled to how close the target is.

use log::debug;
use rayon::prelude::*;

use super::{check_target, Partitioner};
use crate::blockmodel::BlockModel;
use crate::error::Result;
use crate::graph::Graph;
use crate::mcmc;
use crate::mdl::delta_h_merge;
use crate::params::{
    BOTTOM_UP_MCMC_MULTIPLIER, FORCED_MERGE_MCMC_MULTIPLIER, MAX_BOTTOM_UP_MCMC_ITERS,
    MCMC_THRESHOLD_DIVISOR, MERGE_BATCH_SIZE_FACTOR,
};
use crate::rng::derive_seed;

/// Bottom-up agglomerative partitioner.
#[derive(Debug, Clone)]
pub struct BottomUp {
    /// Target cluster count K*.
    target_clusters: usize,
    /// Base random seed (drives the refinement passes).
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct MergeProposal {
    keep: usize,
    absorb: usize,
    delta: f64,
}

impl BottomUp {
    /// Create a bottom-up partitioner aiming for `target_clusters`.
    pub fn new(target_clusters: usize) -> Self {
        Self { target_clusters, seed: None }
    }

    /// Set the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Best improving merge partner for cluster `c`, restricted to
    /// clusters sharing at least one edge with it.
    fn best_partner(model: &BlockModel<'_>, c: usize) -> Option<MergeProposal> {
        if model.sizes()[c] == 0 {
            return None;
        }

        let mut partners: Vec<usize> = Vec::new();
        model.matrix().for_each_in_row(c, |s, _| {
            if s != c && model.sizes()[s] > 0 {
                partners.push(s);
            }
        });

        let mut best: Option<MergeProposal> = None;
        for partner in partners {
            let delta = delta_h_merge(model, c, partner);
            if best.map_or(true, |p| delta < p.delta) {
                best = Some(MergeProposal { keep: c, absorb: partner, delta });
            }
        }
        best.filter(|p| p.delta < 0.0)
    }

    /// Least-bad merge over all non-empty cluster pairs, connected or not.
    fn least_bad_pair(model: &BlockModel<'_>) -> Option<MergeProposal> {
        let k = model.cluster_count();
        (0..k)
            .into_par_iter()
            .filter(|&c1| model.sizes()[c1] > 0)
            .filter_map(|c1| {
                let mut local: Option<MergeProposal> = None;
                for c2 in (c1 + 1)..k {
                    if model.sizes()[c2] == 0 {
                        continue;
                    }
                    let delta = delta_h_merge(model, c1, c2);
                    if local.map_or(true, |p| delta < p.delta) {
                        local = Some(MergeProposal { keep: c1, absorb: c2, delta });
                    }
                }
                local
            })
            .min_by(|a, b| a.delta.total_cmp(&b.delta))
    }

    fn refinement_budget(&self, cluster_count: usize, forced: bool) -> usize {
        let mut iters = MAX_BOTTOM_UP_MCMC_ITERS.min(BOTTOM_UP_MCMC_MULTIPLIER * cluster_count);
        if forced {
            iters = MAX_BOTTOM_UP_MCMC_ITERS.min(FORCED_MERGE_MCMC_MULTIPLIER * cluster_count);
        }
        if cluster_count <= self.target_clusters + 2 {
            iters =
                MAX_BOTTOM_UP_MCMC_ITERS.min(2 * FORCED_MERGE_MCMC_MULTIPLIER * cluster_count);
        }
        iters
    }
}

impl Partitioner for BottomUp {
    fn partition<'g>(&self, graph: &'g Graph) -> Result<BlockModel<'g>> {
        check_target(self.target_clusters)?;
        if graph.is_empty() {
            return Ok(BlockModel::new(graph, 0));
        }

        let n = graph.vertex_count();
        let mut model = BlockModel::singletons(graph);
        let mut round: u64 = 0;

        while model.cluster_count() > self.target_clusters {
            let k = model.cluster_count();

            let mut proposals: Vec<MergeProposal> = (0..k)
                .into_par_iter()
                .filter_map(|c| Self::best_partner(&model, c))
                .collect();

            let mut forced = false;
            if proposals.is_empty() {
                match Self::least_bad_pair(&model) {
                    Some(pair) => {
                        debug!(
                            "bottom-up: forcing merge ({}, {}) at ΔH={:.4}",
                            pair.keep, pair.absorb, pair.delta
                        );
                        proposals.push(pair);
                        forced = true;
                    }
                    None => break,
                }
            }

            proposals.sort_by(|a, b| a.delta.total_cmp(&b.delta));

            // Greedy independent batch, capped so we never overshoot K*.
            let max_merges = ((k as f64 * MERGE_BATCH_SIZE_FACTOR) as usize)
                .min(k - self.target_clusters);
            let mut used = vec![false; k];
            let mut accepted: Vec<MergeProposal> = Vec::new();
            for proposal in proposals {
                if used[proposal.keep] || used[proposal.absorb] {
                    continue;
                }
                used[proposal.keep] = true;
                used[proposal.absorb] = true;
                accepted.push(proposal);
                if accepted.len() >= max_merges {
                    break;
                }
            }

            debug!(
                "bottom-up: applying {} merges at K={} (forced={})",
                accepted.len(),
                k,
                forced
            );
            for proposal in &accepted {
                for label in model.assignment_mut() {
                    if *label == proposal.absorb {
                        *label = proposal.keep;
                    }
                }
            }
            model.renumber_dense();

            let k_now = model.cluster_count();
            if k_now <= n / MCMC_THRESHOLD_DIVISOR {
                mcmc::refine(
                    &mut model,
                    self.refinement_budget(k_now, forced),
                    derive_seed(self.seed, round),
                );
            }

            if model.cluster_count() <= self.target_clusters {
                break;
            }
            round += 1;
        }

        if model.cluster_count() == self.target_clusters {
            let iters = MAX_BOTTOM_UP_MCMC_ITERS
                .min(FORCED_MERGE_MCMC_MULTIPLIER * model.cluster_count());
            mcmc::refine(&mut model, iters, derive_seed(self.seed, round.wrapping_add(1)));
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdl::compute_h;

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
    fn test_merges_down_to_two_cliques() {
        let g = two_cliques_graph();
        let model = BottomUp::new(2).with_seed(31).partition(&g).unwrap();

        assert_eq!(model.cluster_count(), 2);
        model.validate().unwrap();

        let a = model.assignment();
        for clique in [&a[..4], &a[4..]] {
            assert!(clique.iter().all(|&c| c == clique[0]), "clique split: {a:?}");
        }
        assert_ne!(a[0], a[4]);
    }

    #[test]
    fn test_merges_to_single_cluster() {
        let g = two_cliques_graph();
        let model = BottomUp::new(1).with_seed(1).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 1);
        assert!(model.assignment().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_target_at_vertex_count_returns_singletons() {
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let model = BottomUp::new(2).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 2);
        assert_ne!(model.assignment()[0], model.assignment()[1]);
        assert!(compute_h(&model).is_finite());
    }

    #[test]
    fn test_rejects_zero_target() {
        let g = two_cliques_graph();
        assert!(BottomUp::new(0).partition(&g).is_err());
    }

    #[test]
    fn test_empty_graph_yields_zero_clusters() {
        let g = Graph::from_edges(0, &[]).unwrap();
        let model = BottomUp::new(2).partition(&g).unwrap();
        assert_eq!(model.cluster_count(), 0);
    }

    #[test]
    fn test_edgeless_graph_reaches_target_via_forced_merges() {
        let g = Graph::from_edges(10, &[]).unwrap();
        let model = BottomUp::new(3).with_seed(8).partition(&g).unwrap();

        assert_eq!(model.cluster_count(), 3);
        model.validate().unwrap();

        // No edges: the score is pure model complexity.
        let expected = 0.5 * 12.0 * 10.0f64.ln();
        assert!((compute_h(&model) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_non_forced_batches_do_not_raise_h() {
        // With improving merges available at every K on this graph, the
        // final score must undercut the singleton start.
        let g = two_cliques_graph();
        let h_start = compute_h(&BlockModel::singletons(&g));
        let model = BottomUp::new(2).with_seed(3).partition(&g).unwrap();
        assert!(compute_h(&model) < h_start);
    }
}
