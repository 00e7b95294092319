//! Partition state: cluster assignment, block-edge counts, cluster sizes.
//!
//! A [`BlockModel`] binds a partition to a borrowed [`Graph`] and caches the
//! two aggregates every score evaluation needs:
//!
//! - `matrix[r][s]`: directed adjacency entries from cluster r to cluster s
//!   (each undirected edge contributes one entry in each direction, so the
//!   matrix is symmetric and within-cluster edges add 2 to the diagonal);
//! - `sizes[r]`: number of vertices assigned to cluster r.
//!
//! Consistency is maintained two ways: [`BlockModel::update_matrix`] rebuilds
//! everything from the assignment, and [`BlockModel::move_vertex`] updates the
//! caches incrementally in O(deg(v)) for the single-vertex moves the MCMC
//! loop makes. Both leave the structure satisfying the same invariants:
//! sizes sum to N, matrix entries sum to 2M, and every edge `{u, v}` is
//! counted once in each direction.
//!
//! ## Matrix storage
//!
//! The bottom-up merger starts from one cluster per vertex, where a dense
//! K×K matrix is O(N²) and dominates memory. Storage is therefore gated on
//! the cluster count: dense `ndarray` backing up to
//! [`crate::params::DENSE_CLUSTER_LIMIT`], per-row hash maps with zero
//! entries elided above it. The two variants are contract-identical.

use std::collections::HashMap;
use std::time::Duration;

use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::graph::{Graph, Subgraph};
use crate::params::DENSE_CLUSTER_LIMIT;

/// Sentinel for "not yet assigned"; only observable during construction.
pub const NULL_CLUSTER: usize = usize::MAX;

/// Block-edge count matrix with density gated on the cluster count.
#[derive(Debug, Clone)]
pub(crate) enum BlockMatrix {
    Dense(Array2<usize>),
    Sparse(Vec<HashMap<usize, usize>>),
}

impl BlockMatrix {
    /// Zeroed K×K matrix; storage chosen by K.
    pub(crate) fn zeroed(cluster_count: usize) -> Self {
        if cluster_count <= DENSE_CLUSTER_LIMIT {
            Self::dense(cluster_count)
        } else {
            Self::sparse(cluster_count)
        }
    }

    pub(crate) fn dense(cluster_count: usize) -> Self {
        BlockMatrix::Dense(Array2::zeros((cluster_count, cluster_count)))
    }

    pub(crate) fn sparse(cluster_count: usize) -> Self {
        BlockMatrix::Sparse(vec![HashMap::new(); cluster_count])
    }

    pub(crate) fn get(&self, r: usize, s: usize) -> usize {
        match self {
            BlockMatrix::Dense(m) => m[[r, s]],
            BlockMatrix::Sparse(rows) => rows[r].get(&s).copied().unwrap_or(0),
        }
    }

    pub(crate) fn increment(&mut self, r: usize, s: usize) {
        match self {
            BlockMatrix::Dense(m) => m[[r, s]] += 1,
            BlockMatrix::Sparse(rows) => *rows[r].entry(s).or_insert(0) += 1,
        }
    }

    pub(crate) fn decrement(&mut self, r: usize, s: usize) {
        match self {
            BlockMatrix::Dense(m) => {
                debug_assert!(m[[r, s]] > 0, "decrement of zero block count");
                m[[r, s]] -= 1;
            }
            BlockMatrix::Sparse(rows) => {
                let entry = rows[r].get_mut(&s);
                debug_assert!(entry.is_some(), "decrement of zero block count");
                if let Some(count) = entry {
                    *count -= 1;
                    if *count == 0 {
                        rows[r].remove(&s);
                    }
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            BlockMatrix::Dense(m) => m.fill(0),
            BlockMatrix::Sparse(rows) => rows.iter_mut().for_each(HashMap::clear),
        }
    }

    /// Visit every non-zero entry as `(row, col, count)`.
    pub(crate) fn for_each_nonzero(&self, mut f: impl FnMut(usize, usize, usize)) {
        match self {
            BlockMatrix::Dense(m) => {
                for ((r, s), &count) in m.indexed_iter() {
                    if count > 0 {
                        f(r, s, count);
                    }
                }
            }
            BlockMatrix::Sparse(rows) => {
                for (r, row) in rows.iter().enumerate() {
                    for (&s, &count) in row {
                        f(r, s, count);
                    }
                }
            }
        }
    }

    /// Visit the non-zero entries of one row as `(col, count)`.
    pub(crate) fn for_each_in_row(&self, r: usize, mut f: impl FnMut(usize, usize)) {
        match self {
            BlockMatrix::Dense(m) => {
                for (s, &count) in m.row(r).indexed_iter() {
                    if count > 0 {
                        f(s, count);
                    }
                }
            }
            BlockMatrix::Sparse(rows) => {
                for (&s, &count) in &rows[r] {
                    f(s, count);
                }
            }
        }
    }

    /// Sum of all entries (equals 2M on a consistent model).
    pub(crate) fn total(&self) -> usize {
        let mut sum = 0;
        self.for_each_nonzero(|_, _, count| sum += count);
        sum
    }

    fn same_entries(&self, other: &BlockMatrix) -> bool {
        let mut equal = true;
        self.for_each_nonzero(|r, s, count| {
            if other.get(r, s) != count {
                equal = false;
            }
        });
        equal && self.total() == other.total()
    }
}

/// Mutable partition of a borrowed graph into `cluster_count` clusters.
#[derive(Debug, Clone)]
pub struct BlockModel<'g> {
    graph: &'g Graph,
    cluster_count: usize,
    assignment: Vec<usize>,
    sizes: Vec<usize>,
    matrix: BlockMatrix,
    mcmc_runtime: Duration,
}

impl<'g> BlockModel<'g> {
    /// Fresh model with every vertex unassigned (`NULL_CLUSTER`) and all
    /// counts zeroed. Callers set the assignment and then rebuild.
    pub fn new(graph: &'g Graph, cluster_count: usize) -> Self {
        Self {
            graph,
            cluster_count,
            assignment: vec![NULL_CLUSTER; graph.vertex_count()],
            sizes: vec![0; cluster_count],
            matrix: BlockMatrix::zeroed(cluster_count),
            mcmc_runtime: Duration::ZERO,
        }
    }

    /// Single-cluster model: every vertex in cluster 0.
    pub fn unified(graph: &'g Graph) -> Self {
        let mut model = Self::new(graph, 1);
        model.assignment.fill(0);
        model.update_matrix();
        model
    }

    /// Finest model: every vertex in its own cluster (K = N).
    pub fn singletons(graph: &'g Graph) -> Self {
        let n = graph.vertex_count();
        let mut model = Self::new(graph, n);
        for (v, slot) in model.assignment.iter_mut().enumerate() {
            *slot = v;
        }
        model.update_matrix();
        model
    }

    /// The underlying graph.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Current number of clusters K.
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Cluster labels, one per vertex.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Vertices per cluster.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Directed adjacency entries from cluster `r` to cluster `s`.
    pub fn edge_count_between(&self, r: usize, s: usize) -> usize {
        self.matrix.get(r, s)
    }

    /// Total MCMC refinement time spent producing this model.
    pub fn mcmc_runtime(&self) -> Duration {
        self.mcmc_runtime
    }

    pub(crate) fn matrix(&self) -> &BlockMatrix {
        &self.matrix
    }

    pub(crate) fn assignment_mut(&mut self) -> &mut [usize] {
        &mut self.assignment
    }

    pub(crate) fn add_mcmc_runtime(&mut self, elapsed: Duration) {
        self.mcmc_runtime += elapsed;
    }

    /// Reallocate for `cluster_count` clusters, zeroing all counts. The
    /// assignment is untouched; call [`Self::update_matrix`] afterwards.
    pub(crate) fn resize_clusters(&mut self, cluster_count: usize) {
        self.cluster_count = cluster_count;
        self.sizes = vec![0; cluster_count];
        self.matrix = BlockMatrix::zeroed(cluster_count);
    }

    /// Full rebuild of the block matrix and sizes from the assignment.
    ///
    /// Vertices whose label is out of range (the construction sentinel) are
    /// skipped, as are edges into such vertices.
    pub fn update_matrix(&mut self) {
        self.matrix.clear();
        self.sizes.fill(0);

        for v in 0..self.assignment.len() {
            let r = self.assignment[v];
            if r >= self.cluster_count {
                continue;
            }
            self.sizes[r] += 1;
            for &w in self.graph.neighbors(v) {
                let s = self.assignment[w];
                if s >= self.cluster_count {
                    continue;
                }
                self.matrix.increment(r, s);
            }
        }
    }

    /// Move one vertex to `new_cluster`, maintaining all caches in
    /// O(deg(v)). No-op when the vertex already lives there.
    pub fn move_vertex(&mut self, vertex: usize, new_cluster: usize) {
        let old_cluster = self.assignment[vertex];
        if old_cluster == new_cluster {
            return;
        }
        debug_assert!(old_cluster < self.cluster_count);
        debug_assert!(new_cluster < self.cluster_count);

        for &neighbor in self.graph.neighbors(vertex) {
            let c = self.assignment[neighbor];
            if c >= self.cluster_count {
                continue;
            }
            self.matrix.decrement(old_cluster, c);
            self.matrix.decrement(c, old_cluster);
            self.matrix.increment(new_cluster, c);
            self.matrix.increment(c, new_cluster);
        }

        self.sizes[old_cluster] -= 1;
        self.sizes[new_cluster] += 1;
        self.assignment[vertex] = new_cluster;
    }

    /// Compact cluster ids so `0..K` are all in use, then rebuild.
    ///
    /// Relabeling preserves the relative order of surviving ids.
    pub fn renumber_dense(&mut self) {
        let mut present = vec![false; self.cluster_count];
        for &c in &self.assignment {
            if c < self.cluster_count {
                present[c] = true;
            }
        }

        let mut old_to_new = vec![NULL_CLUSTER; self.cluster_count];
        let mut next = 0;
        for (old, &used) in present.iter().enumerate() {
            if used {
                old_to_new[old] = next;
                next += 1;
            }
        }

        for label in &mut self.assignment {
            if *label < old_to_new.len() {
                *label = old_to_new[*label];
            }
        }

        self.resize_clusters(next);
        self.update_matrix();
    }

    /// Project every cluster onto its own [`Subgraph`] with local vertex
    /// numbering. Extraction is per-cluster parallel; outputs are disjoint.
    pub fn cluster_subgraphs(&self) -> Vec<Subgraph> {
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.cluster_count];
        for (v, &c) in self.assignment.iter().enumerate() {
            if c < self.cluster_count {
                members[c].push(v);
            }
        }

        members
            .into_par_iter()
            .enumerate()
            .map(|(cluster, mapping)| {
                let mut global_to_local = HashMap::with_capacity(mapping.len());
                for (local, &global) in mapping.iter().enumerate() {
                    global_to_local.insert(global, local);
                }

                let adjacency: Vec<Vec<usize>> = mapping
                    .iter()
                    .map(|&global| {
                        self.graph
                            .neighbors(global)
                            .iter()
                            .filter(|&&w| self.assignment[w] == cluster)
                            .map(|w| global_to_local[w])
                            .collect()
                    })
                    .collect();

                Subgraph { graph: Graph::from_symmetric_adjacency(adjacency), mapping }
            })
            .collect()
    }

    /// Check structural consistency: labels in range, sizes summing to N,
    /// and the cached matrix/sizes agreeing with a fresh rebuild.
    ///
    /// Exposed so harnesses can assert the invariants after any sequence of
    /// public mutations.
    pub fn validate(&self) -> Result<()> {
        for (v, &c) in self.assignment.iter().enumerate() {
            if c >= self.cluster_count {
                return Err(Error::Other(format!(
                    "vertex {v} assigned to cluster {c} of {}",
                    self.cluster_count
                )));
            }
        }

        let total_size: usize = self.sizes.iter().sum();
        if total_size != self.graph.vertex_count() {
            return Err(Error::Other(format!(
                "cluster sizes sum to {total_size}, expected {}",
                self.graph.vertex_count()
            )));
        }

        if self.matrix.total() != 2 * self.graph.edge_count() {
            return Err(Error::Other(format!(
                "block matrix totals {}, expected {}",
                self.matrix.total(),
                2 * self.graph.edge_count()
            )));
        }

        let mut rebuilt = self.clone();
        rebuilt.update_matrix();
        if rebuilt.sizes != self.sizes {
            return Err(Error::Other("cached sizes diverge from rebuild".into()));
        }
        if !rebuilt.matrix.same_entries(&self.matrix) {
            return Err(Error::Other("cached block matrix diverges from rebuild".into()));
        }

        Ok(())
    }
}
