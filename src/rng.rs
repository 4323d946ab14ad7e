//! Per-thread seed derivation (spec §4.3).
//!
//! Not part of the teacher's stack (it has no RNG dependency at all); pulled
//! in from the rest of the pack — `40tude-fraud_detection_5` depends on
//! `rand` for exactly this kind of seeded sampling. Seeds are drawn
//! sequentially from one root generator so a given `random_seed` reproduces
//! the same per-thread seeds regardless of how threads get scheduled.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Draws `thread_count` per-worker seeds from a root generator seeded by
/// `root_seed` (or OS entropy when `None`).
pub fn derive_worker_seeds(root_seed: Option<u64>, thread_count: usize) -> Vec<u64> {
    let mut rng = match root_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    (0..thread_count).map(|_| rng.next_u64()).collect()
}
