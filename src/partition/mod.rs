//! Partitioning strategies.
//!
//! Two hierarchical routes to a target cluster count `K*`, both driving
//! the same MDL objective and sharing the MCMC refinement loop:
//!
//! - [`TopDown`] starts from one cluster and recursively splits the
//!   cluster whose binary split lowers the description length the most.
//! - [`BottomUp`] starts from one cluster per vertex and merges batches
//!   of cluster pairs with the best analytic merge deltas.
//!
//! Neither guarantees landing exactly on `K*`: top-down stops when no
//! cluster admits a tolerable split, bottom-up forces least-bad merges to
//! keep moving but halts when no pair is left. Callers inspect
//! [`BlockModel::cluster_count`](crate::BlockModel::cluster_count) on the
//! result.

mod bottom_up;
mod top_down;

pub use bottom_up::BottomUp;
pub use top_down::TopDown;

use crate::blockmodel::BlockModel;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// An MDL partitioning strategy.
pub trait Partitioner {
    /// Partition `graph` into clusters, returning the final blockmodel.
    fn partition<'g>(&self, graph: &'g Graph) -> Result<BlockModel<'g>>;
}

pub(crate) fn check_target(target_clusters: usize) -> Result<()> {
    if target_clusters < 1 {
        return Err(Error::InvalidClusterCount { requested: target_clusters });
    }
    Ok(())
}
