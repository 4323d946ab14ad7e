//! Example `Target`/`OperationEngine` plug-ins (spec §6.3).
//!
//! These are not part of the library's public benchmarking contract — they
//! exist only so `src/main.rs` has something concrete to run end to end.
//! Real users of this crate supply their own `Target`/`OperationEngine`
//! implementations over the data structure they actually want to measure.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::{OpKind, OperationEngine};
use crate::target::Target;

/// The two operation kinds the demo engine cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    Read,
    Write,
}

impl OpKind for DemoKind {
    const TOTAL_KINDS: usize = 2;

    fn index(self) -> usize {
        match self {
            DemoKind::Read => 0,
            DemoKind::Write => 1,
        }
    }
}

/// A single `AtomicU64` counter. `Read` performs a `load`, `Write` performs a
/// `fetch_add`; both report one logical operation per call.
#[derive(Debug, Default)]
pub struct AtomicCounterTarget {
    counter: AtomicU64,
}

impl AtomicCounterTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Target<DemoKind, u64> for AtomicCounterTarget {
    fn execute(&self, kind: DemoKind, operand: u64) -> u64 {
        match kind {
            DemoKind::Read => {
                self.counter.load(Ordering::Relaxed);
            }
            DemoKind::Write => {
                self.counter.fetch_add(operand, Ordering::Relaxed);
            }
        }
        1
    }
}

/// Deterministically cycles `Read`/`Write` kinds; `skew_parameter` biases the
/// split toward `Write` (higher values yield more writes per `Read`).
pub struct RoundRobinEngine {
    skew_parameter: f64,
}

impl RoundRobinEngine {
    pub fn new(skew_parameter: f64) -> Self {
        RoundRobinEngine { skew_parameter }
    }
}

pub struct RoundRobinIter {
    write_every: u64,
    step: u64,
}

impl Iterator for RoundRobinIter {
    type Item = (DemoKind, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.step += 1;
        if self.step % self.write_every == 0 {
            Some((DemoKind::Write, 1))
        } else {
            Some((DemoKind::Read, 1))
        }
    }
}

impl OperationEngine for RoundRobinEngine {
    type OpKind = DemoKind;
    type Operation = u64;
    type Iter = RoundRobinIter;

    /// `write_every` grows with `skew_parameter`: 0.0 writes every 2nd op,
    /// larger values push writes further apart (and thus reads further
    /// ahead). `thread_id`/`rand_seed` are unused — the demo engine is
    /// deliberately deterministic so its throughput is reproducible.
    fn get_iter(&self, _thread_id: usize, _rand_seed: u64) -> Self::Iter {
        let write_every = 2 + (self.skew_parameter.max(0.0) as u64);
        RoundRobinIter { write_every, step: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_counter_target_counts_writes() {
        let target = AtomicCounterTarget::new();
        assert_eq!(target.execute(DemoKind::Write, 5), 1);
        assert_eq!(target.value(), 5);
        assert_eq!(target.execute(DemoKind::Read, 0), 1);
        assert_eq!(target.value(), 5);
    }

    #[test]
    fn round_robin_engine_is_infinite_and_deterministic() {
        let engine = RoundRobinEngine::new(0.0);
        let mut iter = engine.get_iter(0, 0);
        let first_ten: Vec<DemoKind> = (0..10).map(|_| iter.next().unwrap().0).collect();

        let engine2 = RoundRobinEngine::new(0.0);
        let mut iter2 = engine2.get_iter(0, 0);
        let first_ten_again: Vec<DemoKind> = (0..10).map(|_| iter2.next().unwrap().0).collect();

        assert_eq!(first_ten, first_ten_again);
        assert!(first_ten.contains(&DemoKind::Write));
    }

    #[test]
    fn higher_skew_widens_write_spacing() {
        let low = RoundRobinEngine::new(0.0);
        let high = RoundRobinEngine::new(10.0);

        let low_writes = low.get_iter(0, 0).take(20).filter(|(k, _)| *k == DemoKind::Write).count();
        let high_writes =
            high.get_iter(0, 0).take(20).filter(|(k, _)| *k == DemoKind::Write).count();

        assert!(high_writes <= low_writes);
    }
}
