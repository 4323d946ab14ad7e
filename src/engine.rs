//! The `OperationEngine` plug-in contract (spec §6).
//!
//! An engine supplies each worker thread with its own operation stream.
//! Concrete engines (Zipfian workload generators, etc.) are out of scope
//! for this crate; see `demo` for a minimal example used by the CLI.

/// A small enumeration of per-benchmark operation kinds, plus an implicit
/// `TotalKinds` sentinel exposed as `OpKind::TOTAL_KINDS`.
///
/// The spec's `OperationIterator::hasMore/current/advance` cursor protocol
/// is collapsed here into the standard `Iterator` trait (`next` doubles as
/// `current`+`advance`, and `None` doubles as "exhausted"): it is the
/// idiomatic Rust shape for "a lazy, finite, non-restartable, per-thread
/// sequence" and every property the spec asks of that protocol —
/// laziness, finiteness, non-restartability, single advance operation — is
/// exactly what `Iterator` already guarantees. See DESIGN.md.
pub trait OpKind: Copy + Send + Sync + 'static {
    /// Number of distinct kinds; the sentinel value from spec §3.
    const TOTAL_KINDS: usize;

    /// This kind's position in `0..TOTAL_KINDS`, used to index the `Sketch`.
    fn index(self) -> usize;
}

/// Supplies one operation iterator per worker thread.
pub trait OperationEngine: Send + Sync {
    type OpKind: OpKind;
    type Operation: Send;
    type Iter: Iterator<Item = (Self::OpKind, Self::Operation)> + Send;

    /// Builds an independent, single-threaded iterator for worker
    /// `thread_id`, seeded from `rand_seed` (drawn sequentially from the
    /// run's root seed by the `Runner`, spec §4.3).
    fn get_iter(&self, thread_id: usize, rand_seed: u64) -> Self::Iter;
}
