//! Error type hierarchy for threadbench.
//!
//! Provides structured error handling with `ConfigError`, `ProgrammingError`,
//! `WorkerFault`, and the top-level `RunError` that `Runner::run` returns.

use thiserror::Error;

/// Bad CLI/config values, rejected before a run ever starts (spec §7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("thread_num must be >= 1, got {0}")]
    ZeroThreads(usize),

    #[error("thread_num {0} exceeds implementation maximum {1}")]
    TooManyThreads(usize, usize),

    #[error("random_seed {0:?} is not a valid u64")]
    InvalidSeed(String),

    #[error("skew_parameter must be >= 0, got {0}")]
    NegativeSkew(f64),

    #[error("timeout must be > 0 seconds, got {0}")]
    NonPositiveTimeout(f64),

    #[error("target_latency quantile {0} is not in [0, 1]")]
    QuantileOutOfRange(f64),

    #[error("target_latency list could not be parsed: {0}")]
    MalformedQuantileList(String),
}

/// Invariant violations: indexing bugs and double-use of one-shot handoffs.
/// These abort the run with a descriptive message; there is no recovery.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgrammingError {
    #[error("ops_kind {kind} out of range (total_kinds={total_kinds})")]
    KindOutOfRange { kind: usize, total_kinds: usize },

    #[error("cannot merge sketches with different total_kinds ({lhs} vs {rhs})")]
    ShapeMismatch { lhs: usize, rhs: usize },

    #[error("Worker::move_sketch called twice on the same worker")]
    DoubleMoveSketch,
}

/// A worker thread terminated abnormally (panicked) during measurement.
#[derive(Error, Debug, Clone)]
#[error("worker {thread_id} faulted: {reason}")]
pub struct WorkerFault {
    pub thread_id: usize,
    pub reason: String,
}

/// Top-level error returned by `Runner::run`. Timeout is deliberately absent
/// here: per spec §7 it is a normal termination, not an error, and is
/// represented instead as `RunOutcome::TimedOut`.
#[derive(Error, Debug, Clone)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Programming(#[from] ProgrammingError),

    #[error(transparent)]
    Worker(#[from] WorkerFault),
}
