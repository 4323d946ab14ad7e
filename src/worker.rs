//! Per-worker measurement loop (spec §4.2).
//!
//! Grounded on the teacher's `collector::LatencyCollector::run` /
//! `jitter::MicroJitterCollector::run`: an allocation-free hot loop gated by
//! a shared `AtomicBool`, timing one unit of work per iteration and folding
//! the result into a histogram-like sketch. Those collectors sleep on a
//! fixed wall-clock cadence; a `Worker` instead drains an `OperationEngine`
//! iterator, but the stop-flag-checked-before-timing discipline is the same.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{OpKind, OperationEngine};
use crate::error::ProgrammingError;
use crate::sketch::Sketch;
use crate::stopwatch::{InstantStopWatch, StopWatch};
use crate::target::Target;

/// Owns one worker's iterator, sketch, and stopwatch; holds a non-owning
/// reference to the shared `Target` and cancellation flag (spec §3).
pub struct Worker<'a, E, T, SW = InstantStopWatch>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
    SW: StopWatch,
{
    target: &'a T,
    iter: E::Iter,
    is_running: Arc<AtomicBool>,
    sketch: Option<Sketch>,
    stopwatch: SW,
}

impl<'a, E, T> Worker<'a, E, T, InstantStopWatch>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
{
    /// Builds the iterator for `thread_id`, allocates a fresh `Sketch` sized
    /// to `E::OpKind::TOTAL_KINDS`, and calls `target.setup_for_worker()`
    /// once (spec §4.2 "Construction").
    pub fn new(target: &'a T, engine: &E, thread_id: usize, rand_seed: u64) -> Self {
        Self::with_stopwatch(target, engine, thread_id, rand_seed, InstantStopWatch::default())
    }
}

impl<'a, E, T, SW> Worker<'a, E, T, SW>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
    SW: StopWatch,
{
    /// Like `new`, but with an explicit `StopWatch` — used by tests to
    /// inject a constant-latency mock (spec §8 scenario 1).
    pub fn with_stopwatch(
        target: &'a T,
        engine: &E,
        thread_id: usize,
        rand_seed: u64,
        stopwatch: SW,
    ) -> Self {
        let iter = engine.get_iter(thread_id, rand_seed);
        target.setup_for_worker();
        Worker {
            target,
            iter,
            is_running: Arc::new(AtomicBool::new(true)),
            sketch: Some(Sketch::new(E::OpKind::TOTAL_KINDS)),
            stopwatch,
        }
    }

    /// Replaces the default cancellation flag with one shared across
    /// workers and owned by the `Runner` (spec §3, §4.3).
    pub fn share_cancellation_flag(&mut self, flag: Arc<AtomicBool>) {
        self.is_running = flag;
    }

    /// Drains the operation iterator, timing each `Target::execute` call and
    /// recording it into the sketch, until exhaustion or cancellation
    /// (spec §4.2).
    ///
    /// The stop flag is checked *before* starting the stopwatch, so
    /// cancellation never truncates a sample that has already started
    /// timing (spec §4.2 "Cancellation").
    pub fn measure(&mut self) {
        let sketch = self.sketch.as_mut().expect("measure called after move_sketch");

        while self.is_running.load(Ordering::Relaxed) {
            let Some((kind, operation)) = self.iter.next() else {
                break;
            };

            self.stopwatch.start();
            let count = self.target.execute(kind, operation);
            self.stopwatch.stop();

            sketch
                .add(kind.index(), count, self.stopwatch.elapsed_ns())
                .expect("kind index is within TOTAL_KINDS by construction");
        }
    }

    /// Surrenders this worker's sketch exactly once. Calling it twice is a
    /// `ProgrammingError` (spec §4.2 "Result handoff").
    pub fn move_sketch(&mut self) -> Result<Sketch, ProgrammingError> {
        self.sketch.take().ok_or(ProgrammingError::DoubleMoveSketch)
    }
}

impl<'a, E, T, SW> Drop for Worker<'a, E, T, SW>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
    SW: StopWatch,
{
    fn drop(&mut self) {
        self.target.teardown_for_worker();
    }
}
