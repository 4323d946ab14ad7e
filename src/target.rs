//! The `Target` plug-in contract (spec §6).
//!
//! A `Target` is the concurrent data structure, lock, or atomic primitive
//! under test. It is externally owned and outlives the `Runner`; this crate
//! only ever borrows it. Concrete targets (locks, CAS primitives, page
//! structures) are out of scope for this crate — see `demo` for a minimal
//! example used by the CLI binary.

/// One logical step against the benchmarked data structure.
///
/// `execute` is called on many threads concurrently against the same
/// `Target` instance; thread-safety is the `Target`'s responsibility, not
/// the harness's. It returns the number of logical operations actually
/// performed (>= 1), which lets a single call self-report batched or
/// retried work (spec §9, "Open question: retry-heavy execute" — the
/// stopwatch times wall clock including any internal retries; the count
/// returned is logical operations, not retry attempts).
pub trait Target<Kind, Operation>: Send + Sync {
    /// Called once per worker thread before measurement begins.
    fn setup_for_worker(&self) {}

    /// Called once per worker thread when the worker is torn down.
    fn teardown_for_worker(&self) {}

    /// Reserved pre-measurement hook, called once by the `Runner` before any
    /// worker starts. No-op by default.
    fn pre_process(&self) {}

    /// Reserved post-measurement hook, called once by the `Runner` after all
    /// workers have finished. No-op by default.
    fn post_process(&self) {}

    /// Performs one logical step of kind `kind` against `operation`.
    /// Returns the number of logical operations performed.
    fn execute(&self, kind: Kind, operation: Operation) -> u64;
}
