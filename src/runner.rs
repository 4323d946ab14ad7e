//! Coordinated multi-threaded runner (spec §4.3).
//!
//! Grounded on two teacher patterns: `stressor::StressorManager` (spawns
//! worker threads that poll a shared `Arc<AtomicBool>` stop flag, joins them
//! on teardown) for the worker lifecycle, and `log_collector.rs`'s use of
//! `crossbeam_channel` for cross-thread handoff, adapted here to a
//! one-shot-per-worker bounded(1) channel so each worker's `Sketch` is
//! collected with exactly-once ownership transfer and a deadline.
//!
//! State machine: `Idle -> Spawning -> Preparing -> Running -> Draining ->
//! Reporting -> Idle`. Cancellation (timeout) transitions `Running ->
//! Draining` directly, without a further deadline (spec §4.3).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, RecvTimeoutError};

use crate::config::{validate, Config};
use crate::engine::{OpKind, OperationEngine};
use crate::error::{ConfigError, RunError, WorkerFault};
use crate::rng::derive_worker_seeds;
use crate::sketch::Sketch;
use crate::target::Target;
use crate::worker::Worker;

/// Outcome of a completed run. Timeout is not an error (spec §7): a
/// `TimedOut` run still carries a fully-formed, mergeable aggregate sketch.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(Sketch),
    TimedOut(Sketch),
}

impl RunOutcome {
    pub fn sketch(&self) -> &Sketch {
        match self {
            RunOutcome::Completed(s) | RunOutcome::TimedOut(s) => s,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, RunOutcome::TimedOut(_))
    }
}

/// Builds workers, spawns threads, synchronizes start, enforces timeout,
/// aggregates worker sketches. Borrows `Target` and `OperationEngine` for
/// its entire lifetime; both must outlive the `Runner` (spec §3).
pub struct Runner<'a, E, T>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
{
    config: Config,
    target: &'a T,
    engine: &'a E,
}

impl<'a, E, T> Runner<'a, E, T>
where
    E: OperationEngine,
    T: Target<E::OpKind, E::Operation>,
{
    /// Validates `config` and builds a `Runner` borrowing `target` and
    /// `engine` for the duration of the run.
    pub fn new(config: Config, target: &'a T, engine: &'a E) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Runner { config, target, engine })
    }

    /// Runs the full protocol described in spec §4.3 steps 1-7.
    pub fn run(&self) -> Result<RunOutcome, RunError> {
        self.target.pre_process();

        let thread_count = self.config.thread_count;
        let seeds = derive_worker_seeds(self.config.random_seed, thread_count);

        // Step 1: shared state.
        let is_running = Arc::new(AtomicBool::new(true));
        let ready = Arc::new(AtomicBool::new(false));
        let worker_ready_count = Arc::new(AtomicUsize::new(0));

        let mut receivers = Vec::with_capacity(thread_count);

        let outcome: Result<(Vec<Sketch>, bool), WorkerFault> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(thread_count);

            // Step 2: spawn one thread per worker.
            log::debug!("[RUNNER] spawning {} worker thread(s)", thread_count);
            for thread_id in 0..thread_count {
                let (tx, rx) = bounded::<Sketch>(1);
                receivers.push(rx);

                let is_running = Arc::clone(&is_running);
                let ready = Arc::clone(&ready);
                let worker_ready_count = Arc::clone(&worker_ready_count);
                let seed = seeds[thread_id];
                let target = self.target;
                let engine = self.engine;

                let handle = scope.spawn(move || {
                    // 2a. Construct: build iterator, call setup_for_worker.
                    let mut worker = Worker::new(target, engine, thread_id, seed);
                    worker.share_cancellation_flag(is_running);

                    // 2b. Signal readiness.
                    worker_ready_count.fetch_add(1, Ordering::AcqRel);

                    // 2c. Spin until released.
                    while !ready.load(Ordering::Acquire) {
                        std::hint::spin_loop();
                    }

                    // 2d. Measure.
                    worker.measure();

                    // 2e. Fulfill the future with the moved sketch. A
                    // send failure means the controller already gave up on
                    // this channel (shouldn't happen: the controller always
                    // waits for every receiver), so it is safe to ignore.
                    let sketch =
                        worker.move_sketch().expect("move_sketch called exactly once per worker");
                    let _ = tx.send(sketch);
                });

                handles.push(handle);
            }

            // Step 3: controller busy-waits for every worker to finish setup.
            while worker_ready_count.load(Ordering::Acquire) < thread_count {
                std::hint::spin_loop();
            }

            // Step 4: record the deadline, then release the barrier.
            let deadline = Instant::now() + self.config.timeout;
            ready.store(true, Ordering::Release);
            log::debug!(
                "[RUNNER] barrier released, {} worker(s) measuring, timeout={:?}",
                thread_count,
                self.config.timeout
            );

            // Step 5: collect results, enforcing the deadline once.
            let mut sketches = Vec::with_capacity(thread_count);
            let mut timed_out = false;
            let mut fault: Option<WorkerFault> = None;

            for (thread_id, rx) in receivers.iter().enumerate() {
                let received = if timed_out {
                    rx.recv().map_err(|_| ())
                } else {
                    match rx.recv_deadline(deadline) {
                        Ok(sketch) => Ok(sketch),
                        Err(RecvTimeoutError::Timeout) => {
                            log::warn!(
                                "[RUNNER] deadline reached before worker {} finished; signaling cancellation",
                                thread_id
                            );
                            is_running.store(false, Ordering::Relaxed);
                            timed_out = true;
                            rx.recv().map_err(|_| ())
                        }
                        Err(RecvTimeoutError::Disconnected) => Err(()),
                    }
                };

                match received {
                    Ok(sketch) => sketches.push(sketch),
                    Err(()) if fault.is_none() => {
                        fault = Some(WorkerFault {
                            thread_id,
                            reason: "worker channel disconnected without a result".to_string(),
                        });
                    }
                    Err(()) => {}
                }
            }

            // Join every handle so a panic surfaces as a WorkerFault instead
            // of `thread::scope` propagating it as a raw panic.
            for (thread_id, handle) in handles.into_iter().enumerate() {
                if let Err(panic) = handle.join() {
                    if fault.is_none() {
                        fault = Some(WorkerFault { thread_id, reason: panic_message(&panic) });
                    }
                }
            }

            match fault {
                Some(f) => Err(f),
                None => Ok((sketches, timed_out)),
            }
        });

        let (sketches, timed_out) = outcome?;

        // Step 6: merge pairwise into the first sketch.
        log::debug!("[RUNNER] merging {} worker sketch(es)", thread_count);
        let mut sketches = sketches.into_iter();
        let mut aggregate =
            sketches.next().expect("validate() rejects thread_count == 0, so >= 1 sketch exists");
        for sketch in sketches {
            aggregate.merge(&sketch)?;
        }

        self.target.post_process();

        if timed_out {
            Ok(RunOutcome::TimedOut(aggregate))
        } else {
            Ok(RunOutcome::Completed(aggregate))
        }
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker thread panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Kind {
        Read,
    }

    impl OpKind for Kind {
        const TOTAL_KINDS: usize = 1;
        fn index(self) -> usize {
            0
        }
    }

    struct ConstantLatencyTarget {
        latency_ns: u64,
    }

    impl Target<Kind, u64> for ConstantLatencyTarget {
        fn execute(&self, _kind: Kind, _operation: u64) -> u64 {
            // Busy-spin approximately latency_ns worth of wall time so the
            // real InstantStopWatch records something close to latency_ns.
            let start = Instant::now();
            while start.elapsed().as_nanos() < latency_ns_as_u128(self.latency_ns) {}
            1
        }
    }

    fn latency_ns_as_u128(ns: u64) -> u128 {
        ns as u128
    }

    struct CountingEngine {
        per_thread_ops: usize,
    }

    struct CountingIter {
        remaining: usize,
    }

    impl Iterator for CountingIter {
        type Item = (Kind, u64);
        fn next(&mut self) -> Option<Self::Item> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some((Kind::Read, 1))
        }
    }

    impl OperationEngine for CountingEngine {
        type OpKind = Kind;
        type Operation = u64;
        type Iter = CountingIter;

        fn get_iter(&self, _thread_id: usize, _rand_seed: u64) -> Self::Iter {
            CountingIter { remaining: self.per_thread_ops }
        }
    }

    struct InfiniteEngine;

    struct InfiniteIter;

    impl Iterator for InfiniteIter {
        type Item = (Kind, u64);
        fn next(&mut self) -> Option<Self::Item> {
            Some((Kind::Read, 1))
        }
    }

    impl OperationEngine for InfiniteEngine {
        type OpKind = Kind;
        type Operation = u64;
        type Iter = InfiniteIter;

        fn get_iter(&self, _thread_id: usize, _rand_seed: u64) -> Self::Iter {
            InfiniteIter
        }
    }

    struct NoopTarget;
    impl Target<Kind, u64> for NoopTarget {
        fn execute(&self, _kind: Kind, _operation: u64) -> u64 {
            1
        }
    }

    #[test]
    fn single_threaded_run_completes_and_counts_all_ops() {
        let target = NoopTarget;
        let engine = CountingEngine { per_thread_ops: 1000 };
        let mut config = Config::default();
        config.thread_count = 1;
        config.timeout = Duration::from_secs(5);

        let runner = Runner::new(config, &target, &engine).unwrap();
        let outcome = runner.run().unwrap();

        assert!(!outcome.timed_out());
        assert_eq!(outcome.sketch().total_exec_count(), 1000);
    }

    #[test]
    fn multi_threaded_run_merges_all_worker_sketches() {
        let target = NoopTarget;
        let engine = CountingEngine { per_thread_ops: 500 };
        let mut config = Config::default();
        config.thread_count = 4;
        config.timeout = Duration::from_secs(5);

        let runner = Runner::new(config, &target, &engine).unwrap();
        let outcome = runner.run().unwrap();

        assert!(!outcome.timed_out());
        assert_eq!(outcome.sketch().total_exec_count(), 2000);
    }

    #[test]
    fn timeout_on_unbounded_engine_returns_promptly_with_partial_results() {
        let target = NoopTarget;
        let engine = InfiniteEngine;
        let mut config = Config::default();
        config.thread_count = 2;
        config.timeout = Duration::from_millis(20);

        let runner = Runner::new(config, &target, &engine).unwrap();
        let start = Instant::now();
        let outcome = runner.run().unwrap();
        let elapsed = start.elapsed();

        assert!(outcome.timed_out());
        assert!(outcome.sketch().total_exec_count() > 0);
        // Generous slack: the loop body is a cheap enum match, so the
        // Worker itself should notice cancellation within a few ms.
        assert!(elapsed < Duration::from_secs(2), "elapsed={elapsed:?}");
    }

    #[test]
    fn zero_threads_rejected_before_any_thread_spawns() {
        let target = NoopTarget;
        let engine = CountingEngine { per_thread_ops: 1 };
        let mut config = Config::default();
        config.thread_count = 0;

        let err = Runner::new(config, &target, &engine).unwrap_err();
        assert_eq!(err, ConfigError::ZeroThreads(0));
    }

    #[test]
    fn panicking_worker_surfaces_as_worker_fault() {
        struct PanickingTarget;
        impl Target<Kind, u64> for PanickingTarget {
            fn execute(&self, _kind: Kind, _operation: u64) -> u64 {
                panic!("synthetic worker fault for test");
            }
        }

        let target = PanickingTarget;
        let engine = CountingEngine { per_thread_ops: 1 };
        let mut config = Config::default();
        config.thread_count = 1;
        config.timeout = Duration::from_secs(5);

        let runner = Runner::new(config, &target, &engine).unwrap();
        let err = runner.run().unwrap_err();
        assert!(matches!(err, RunError::Worker(_)));
    }
}
