//! Tuning parameters for the partitioning heuristics.
//!
//! These are deliberately plain constants rather than per-call options:
//! they encode the accuracy/speed trade-off the algorithms were tuned at,
//! and the builders expose only the knobs that vary per experiment
//! (target cluster count, proposals per split, seed).

/// Top-down accepts a binary split when `h_after < h_before + tol·|h_before|`.
pub const SPLIT_TOLERANCE: f64 = 0.05;

/// MCMC iterations after each accepted top-down split, per vertex.
pub const MCMC_REFINEMENT_MULTIPLIER: usize = 10;

/// Baseline bottom-up MCMC iterations per remaining cluster.
pub const BOTTOM_UP_MCMC_MULTIPLIER: usize = 50;

/// Hard cap on a single bottom-up refinement pass.
pub const MAX_BOTTOM_UP_MCMC_ITERS: usize = 2000;

/// Fraction of the current clusters that may merge in one batch.
pub const MERGE_BATCH_SIZE_FACTOR: f64 = 0.5;

/// Bottom-up refinement starts once `K ≤ N / MCMC_THRESHOLD_DIVISOR`.
pub const MCMC_THRESHOLD_DIVISOR: usize = 5;

/// Refinement multiplier after a forced (least-bad) merge.
pub const FORCED_MERGE_MCMC_MULTIPLIER: usize = 100;

/// Snowball split proposals per cluster when the caller does not override.
pub const DEFAULT_PROPOSALS_PER_SPLIT: usize = 50;

/// Block matrices switch from dense to sparse storage above this cluster
/// count. Bottom-up starts at K = N, where a dense K×K matrix is the
/// dominant allocation.
pub const DENSE_CLUSTER_LIMIT: usize = 1024;
