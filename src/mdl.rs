//! Minimum description length scoring for blockmodels.
//!
//! The objective balances data fit against model complexity:
//!
//! ```text
//! H(B) = −0.5 · Σ_{r,s} M[r][s] · ln( M[r][s] / (n_r · n_s) )
//!      +  0.5 · K·(K+1) · ln(N)
//! ```
//!
//! The sum runs over ordered cluster pairs with `M[r][s] > 0` and both
//! cluster sizes positive, so `0·ln 0` terms never arise. Because the block
//! matrix counts each undirected edge once per direction, the ordered sum
//! sees every edge twice; the −0.5 coefficient compensates. The complexity
//! term charges for the K·(K+1)/2 free parameters of a symmetric block
//! matrix.
//!
//! Lower is better. A partition is worth keeping when its H undercuts
//! [`compute_h_null`], the score of the single-cluster model, which is also
//! the normalizer for [`compute_h_normalized`].
//!
//! [`delta_h_merge`] evaluates a candidate merge analytically from the two
//! affected rows instead of rebuilding the matrix; the bottom-up merger
//! calls it O(K²) times per sweep.

use std::collections::HashMap;

use crate::blockmodel::BlockModel;
use crate::graph::Graph;

/// One data term: `m · ln(m / (a·b))`, with `m = 0` contributing nothing.
#[inline]
fn data_term(m: usize, a: f64, b: f64) -> f64 {
    if m == 0 {
        return 0.0;
    }
    let m = m as f64;
    m * (m / (a * b)).ln()
}

/// Total description length of a blockmodel.
///
/// Returns 0.0 for the degenerate empty model (no vertices or no clusters).
pub fn compute_h(model: &BlockModel<'_>) -> f64 {
    let n = model.graph().vertex_count();
    let k = model.cluster_count();
    if n == 0 || k == 0 {
        return 0.0;
    }

    let sizes = model.sizes();
    let mut data = 0.0;
    model.matrix().for_each_nonzero(|r, s, m| {
        let (nr, ns) = (sizes[r], sizes[s]);
        if nr > 0 && ns > 0 {
            data += data_term(m, nr as f64, ns as f64);
        }
    });

    let complexity = 0.5 * (k * (k + 1)) as f64 * (n as f64).ln();
    -0.5 * data + complexity
}

/// Description length of the single-cluster model of `graph`.
pub fn compute_h_null(graph: &Graph) -> f64 {
    compute_h(&BlockModel::unified(graph))
}

/// `H(B) / H_null(G)`; 0.0 when the null score is zero.
pub fn compute_h_normalized(model: &BlockModel<'_>) -> f64 {
    let h_null = compute_h_null(model.graph());
    if h_null == 0.0 {
        return 0.0;
    }
    compute_h(model) / h_null
}

/// Analytic change in H if clusters `c1` and `c2` merge.
///
/// Computed from the two affected rows without touching the rest of the
/// matrix; with sparse storage this is O(nnz(c1) + nnz(c2)). Relies on the
/// matrix being symmetric, so column contributions mirror row
/// contributions.
///
/// Returns `+∞` when either cluster is empty or an index is out of range,
/// and `0.0` when `c1 == c2`.
pub fn delta_h_merge(model: &BlockModel<'_>, c1: usize, c2: usize) -> f64 {
    let k = model.cluster_count();
    if c1 >= k || c2 >= k {
        return f64::INFINITY;
    }
    if c1 == c2 {
        return 0.0;
    }

    let sizes = model.sizes();
    let (n1, n2) = (sizes[c1], sizes[c2]);
    if n1 == 0 || n2 == 0 {
        return f64::INFINITY;
    }
    let (n1, n2) = (n1 as f64, n2 as f64);
    let merged = n1 + n2;

    // Off-diagonal neighbors of either row, with their counts toward each.
    let mut combined: HashMap<usize, (usize, usize)> = HashMap::new();
    let matrix = model.matrix();
    matrix.for_each_in_row(c1, |s, m| {
        if s != c1 && s != c2 {
            combined.entry(s).or_insert((0, 0)).0 = m;
        }
    });
    matrix.for_each_in_row(c2, |s, m| {
        if s != c1 && s != c2 {
            combined.entry(s).or_insert((0, 0)).1 = m;
        }
    });

    let mut removed = 0.0;
    let mut added = 0.0;
    for (&s, &(m1, m2)) in &combined {
        let ns = sizes[s];
        if ns == 0 {
            continue;
        }
        let ns = ns as f64;
        // Row and mirrored column entries, hence the factor 2.
        removed += 2.0 * (data_term(m1, n1, ns) + data_term(m2, n2, ns));
        added += 2.0 * data_term(m1 + m2, merged, ns);
    }

    let m11 = matrix.get(c1, c1);
    let m22 = matrix.get(c2, c2);
    let m12 = matrix.get(c1, c2);
    removed += data_term(m11, n1, n1) + data_term(m22, n2, n2) + 2.0 * data_term(m12, n1, n2);
    added += data_term(m11 + m22 + 2 * m12, merged, merged);

    let delta_data = -0.5 * (added - removed);
    // 0.5·((K−1)·K − K·(K+1))·ln N collapses to −K·ln N.
    let delta_complexity = -(k as f64) * (model.graph().vertex_count() as f64).ln();
    delta_data + delta_complexity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockmodel::BlockModel;
    use rand::prelude::*;

    fn random_graph(n: usize, p: f64, rng: &mut StdRng) -> Graph {
        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.random_range(0.0..1.0) < p {
                    edges.push((u, v));
                }
            }
        }
        Graph::from_edges(n, &edges).unwrap()
    }

    fn striped_model(graph: &Graph, k: usize) -> BlockModel<'_> {
        let mut bm = BlockModel::new(graph, k);
        for (v, slot) in bm.assignment_mut().iter_mut().enumerate() {
            *slot = v % k;
        }
        bm.update_matrix();
        bm
    }

    #[test]
    fn test_unified_matches_null_score() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = random_graph(25, 0.2, &mut rng);
        let unified = BlockModel::unified(&g);
        assert_eq!(compute_h(&unified), compute_h_null(&g));
        assert!((compute_h_normalized(&unified) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_edge_score() {
        // One edge on two vertices: data term ln 2, complexity ln 2.
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let h = compute_h(&BlockModel::unified(&g));
        let expected = 2.0 * 2.0f64.ln();
        assert!((h - expected).abs() < 1e-12, "h={h}, expected={expected}");
    }

    #[test]
    fn test_edgeless_graph_is_pure_complexity() {
        let g = Graph::from_edges(10, &[]).unwrap();
        let mut bm = BlockModel::new(&g, 3);
        for (v, slot) in bm.assignment_mut().iter_mut().enumerate() {
            *slot = v % 3;
        }
        bm.update_matrix();

        let expected = 0.5 * 12.0 * 10.0f64.ln();
        assert!((compute_h(&bm) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_graph_scores_zero() {
        let g = Graph::from_edges(0, &[]).unwrap();
        let bm = BlockModel::new(&g, 0);
        assert_eq!(compute_h(&bm), 0.0);
        assert_eq!(compute_h_normalized(&bm), 0.0);
    }

    #[test]
    fn test_delta_merge_matches_full_recompute() {
        let mut rng = StdRng::seed_from_u64(17);
        let g = random_graph(36, 0.25, &mut rng);
        let k = 6;
        let bm = striped_model(&g, k);
        let h_before = compute_h(&bm);

        for (c1, c2) in [(0, 1), (2, 5), (4, 0), (3, 2)] {
            let delta = delta_h_merge(&bm, c1, c2);

            let mut merged = bm.clone();
            for label in merged.assignment_mut() {
                if *label == c2 {
                    *label = c1;
                }
            }
            merged.renumber_dense();
            assert_eq!(merged.cluster_count(), k - 1);

            let actual = compute_h(&merged) - h_before;
            let tolerance = 1e-9 * actual.abs().max(1.0);
            assert!(
                (delta - actual).abs() < tolerance,
                "merge ({c1},{c2}): delta={delta}, actual={actual}"
            );
        }
    }

    #[test]
    fn test_delta_merge_sentinels() {
        let g = Graph::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        let bm = striped_model(&g, 2);

        assert_eq!(delta_h_merge(&bm, 0, 0), 0.0);
        assert_eq!(delta_h_merge(&bm, 0, 9), f64::INFINITY);

        let mut with_empty = BlockModel::new(&g, 3);
        for (v, slot) in with_empty.assignment_mut().iter_mut().enumerate() {
            *slot = v % 2;
        }
        with_empty.update_matrix();
        assert_eq!(delta_h_merge(&with_empty, 0, 2), f64::INFINITY);
    }

    #[test]
    fn test_good_partition_beats_null_on_planted_structure() {
        // Two tight cliques with one bridge; the planted 2-way split should
        // describe the graph more cheaply than one block.
        let g = Graph::from_edges(
            8,
            &[
                (0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3),
                (4, 5), (4, 6), (4, 7), (5, 6), (5, 7), (6, 7),
                (3, 4),
            ],
        )
        .unwrap();
        let mut bm = BlockModel::new(&g, 2);
        for (v, slot) in bm.assignment_mut().iter_mut().enumerate() {
            *slot = usize::from(v >= 4);
        }
        bm.update_matrix();

        assert!(compute_h(&bm) < compute_h_null(&g));
        assert!(compute_h_normalized(&bm) < 1.0);
    }
}
