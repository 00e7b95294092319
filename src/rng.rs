//! Per-task random number generators.
//!
//! Parallel phases (snowball proposals, MCMC replicas) each own a private
//! generator. Seeded runs derive one stream per task from the base seed and
//! the task index; unseeded runs pull from the operating system. Because
//! replica selection races on ties and thread counts vary, a fixed seed
//! buys statistical repeatability, not bit-identical output.

use rand::prelude::*;

/// Golden-ratio odd multiplier (splitmix64); spreads consecutive task
/// indices across the seed space.
const TASK_SEED_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generator for one parallel task.
pub(crate) fn task_rng(base_seed: Option<u64>, task_index: u64) -> StdRng {
    match base_seed {
        Some(seed) => {
            let stream = task_index.wrapping_add(1).wrapping_mul(TASK_SEED_MULTIPLIER);
            StdRng::seed_from_u64(seed ^ stream)
        }
        None => StdRng::from_os_rng(),
    }
}

/// Derive a sub-seed for a nested parallel phase (e.g. the snowball
/// proposals of one outer round). `None` stays `None`.
pub(crate) fn derive_seed(base_seed: Option<u64>, salt: u64) -> Option<u64> {
    base_seed.map(|seed| seed ^ salt.wrapping_add(1).wrapping_mul(TASK_SEED_MULTIPLIER))
}
