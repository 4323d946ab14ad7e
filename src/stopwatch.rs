//! Abstract high-resolution timer (spec §1: "treated as an abstract
//! nanosecond timer", out of scope as a concrete clock implementation).
//!
//! Grounded on the teacher's `CLOCK_MONOTONIC`-based hot loops
//! (`collector.rs`, `jitter.rs`): one `start`/`stop` pair bracketing a single
//! measured call, queried once for elapsed nanoseconds. The production
//! implementation wraps `std::time::Instant`; tests inject a constant-
//! latency mock (spec §8 scenario 1).

use std::time::Instant;

pub trait StopWatch {
    fn start(&mut self);
    fn stop(&mut self);
    /// Nanoseconds elapsed between the most recent `start` and `stop`.
    fn elapsed_ns(&self) -> u64;
}

/// Default `StopWatch`, backed by `std::time::Instant`.
#[derive(Debug, Default)]
pub struct InstantStopWatch {
    started_at: Option<Instant>,
    elapsed_ns: u64,
}

impl StopWatch for InstantStopWatch {
    fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed_ns = started_at.elapsed().as_nanos() as u64;
        }
    }

    fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }
}

/// A stopwatch that always reports a fixed latency, used to drive spec §8
/// scenario 1 ("stopwatch is mocked to always yield 100 ns") from this
/// crate's own test modules (`worker`, `runner`).
#[cfg(test)]
#[derive(Default, Clone, Copy)]
pub(crate) struct ConstantStopWatch {
    pub fixed_ns: u64,
}

#[cfg(test)]
impl StopWatch for ConstantStopWatch {
    fn start(&mut self) {}
    fn stop(&mut self) {}
    fn elapsed_ns(&self) -> u64 {
        self.fixed_ns
    }
}
