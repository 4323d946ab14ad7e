//! threadbench: a coordinated multi-threaded micro-benchmark harness.
//!
//! A `Runner` spawns one worker thread per configured thread, releases them
//! through a start barrier at the same instant, lets each one drain
//! operations supplied by an `OperationEngine` against a user-supplied
//! `Target`, and aggregates the resulting per-operation-kind latency
//! distributions into a single `Sketch`. Measurement stops at the earlier of
//! iterator exhaustion or a configured timeout.
//!
//! The system is organized into functional modules:
//! - **error**: unified error type hierarchy (`ConfigError`, `ProgrammingError`,
//!   `WorkerFault`, `RunError`)
//! - **sketch**: mergeable, log-spaced quantile histogram
//! - **target**: the `Target` trait implemented by the code under benchmark
//! - **engine**: the `OperationEngine`/`OpKind` traits that supply work
//! - **stopwatch**: injectable timing source (`StopWatch`)
//! - **worker**: the per-thread measurement loop
//! - **runner**: thread coordination, start barrier, timeout, aggregation
//! - **config**: `Config` and its validation
//! - **rng**: deterministic per-thread seed derivation
//! - **output**: text/CSV report formatting
//! - **demo**: example `Target`/`OperationEngine` plug-ins used by the CLI

#![allow(dead_code)]

pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod output;
pub mod rng;
pub mod runner;
pub mod sketch;
pub mod stopwatch;
pub mod target;
pub mod worker;

pub use config::Config;
pub use engine::{OpKind, OperationEngine};
pub use error::{ConfigError, ProgrammingError, RunError, WorkerFault};
pub use runner::{RunOutcome, Runner};
pub use sketch::Sketch;
pub use target::Target;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_constant_is_set() {
        assert_eq!(VERSION, "0.1.0");
    }
}
