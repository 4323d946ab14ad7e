//! Approximate-quantile store.
//!
//! A simplified, mergeable DDSketch: latencies are bucketed on a log scale so
//! that any two samples whose ratio is below `Gamma` land in the same bucket,
//! bounding the relative error of quantile queries to `Alpha` on each side.
//!
//! Grounded on the teacher's histogram-backed latency collectors
//! (`jitter::MicroJitterCollector`, `collector::LatencyCollector`), which
//! record into a fixed-width histogram inside a stop-flag-gated hot loop and
//! query percentiles only after the loop ends. The bucket layout itself is
//! hand-rolled per spec §4.1 rather than delegated to `hdrhistogram`, because
//! the spec requires exact control over bin mapping, clamping, and
//! `ShapeMismatch` on merge of unequal shapes.

use crate::error::ProgrammingError;

/// Bucket count per `ops_kind`. Latencies beyond `Gamma^(BIN_COUNT-1)` ns are
/// clamped into the last bucket rather than indexed out of bounds (spec §9,
/// "Open question: bin clamping" — treated as a defect in the source and
/// fixed here).
pub const BIN_COUNT: usize = 2048;

/// Target relative error.
pub const ALPHA: f64 = 0.01;

/// `(1+Alpha)/(1-Alpha)`, the per-bucket growth ratio.
pub fn gamma() -> f64 {
    (1.0 + ALPHA) / (1.0 - ALPHA)
}

/// `ln(Gamma)`, the log-scale bucket width.
fn denom() -> f64 {
    gamma().ln()
}

fn bin_index(latency_ns: u64) -> usize {
    if latency_ns == 0 {
        return 0;
    }
    let idx = (latency_ns as f64).ln() / denom();
    let idx = idx.ceil();
    if idx < 0.0 {
        0
    } else if idx as usize >= BIN_COUNT {
        BIN_COUNT - 1
    } else {
        idx as usize
    }
}

/// Midpoint of bucket `i`'s value range under the log-linear mapping:
/// `floor(2 * Gamma^i / (Gamma + 1))`.
fn bin_midpoint(i: usize) -> u64 {
    let g = gamma();
    let value = 2.0 * g.powi(i as i32) / (g + 1.0);
    value.floor() as u64
}

/// Per-kind, mergeable latency sketch.
///
/// Invariants (spec §3):
/// - every per-kind vector has length `total_kinds`
/// - for each kind `k`, `sum(buckets[k]) == exec_count[k]`
/// - `min[k] <= max[k]` whenever `exec_count[k] > 0`
#[derive(Debug, Clone)]
pub struct Sketch {
    total_kinds: usize,
    min: Vec<u64>,
    max: Vec<u64>,
    exec_count: Vec<u64>,
    buckets: Vec<[u32; BIN_COUNT]>,
    total_exec_count: u64,
    total_exec_time_nano: u64,
}

impl Sketch {
    /// Allocates all per-kind vectors of length `total_kinds`.
    pub fn new(total_kinds: usize) -> Self {
        Sketch {
            total_kinds,
            min: vec![u64::MAX; total_kinds],
            max: vec![0; total_kinds],
            exec_count: vec![0; total_kinds],
            buckets: vec![[0u32; BIN_COUNT]; total_kinds],
            total_exec_count: 0,
            total_exec_time_nano: 0,
        }
    }

    pub fn total_kinds(&self) -> usize {
        self.total_kinds
    }

    fn check_kind(&self, kind: usize) -> Result<(), ProgrammingError> {
        if kind >= self.total_kinds {
            Err(ProgrammingError::KindOutOfRange { kind, total_kinds: self.total_kinds })
        } else {
            Ok(())
        }
    }

    /// Records one timing sample for `kind`, reporting `count` logical
    /// operations performed (not necessarily 1 — see spec §4.1). `count`
    /// feeds only the throughput totals; the sketch's own sample count
    /// (`exec_count`) is always incremented by exactly one per call.
    pub fn add(&mut self, kind: usize, count: u64, latency_ns: u64) -> Result<(), ProgrammingError> {
        self.check_kind(kind)?;

        self.total_exec_count += count;
        self.total_exec_time_nano += latency_ns;

        if latency_ns < self.min[kind] {
            self.min[kind] = latency_ns;
        }
        if latency_ns > self.max[kind] {
            self.max[kind] = latency_ns;
        }

        let bin = bin_index(latency_ns);
        self.buckets[kind][bin] += 1;
        self.exec_count[kind] += 1;

        Ok(())
    }

    /// True iff any sample has been recorded for `kind`.
    pub fn has_samples(&self, kind: usize) -> bool {
        kind < self.total_kinds && self.exec_count[kind] > 0
    }

    /// Number of timing samples recorded for `kind` (distinct from the
    /// throughput-facing `total_exec_count`, which may count several
    /// logical operations per sample).
    pub fn sample_count(&self, kind: usize) -> Result<u64, ProgrammingError> {
        self.check_kind(kind)?;
        Ok(self.exec_count[kind])
    }

    pub fn min(&self, kind: usize) -> Result<u64, ProgrammingError> {
        self.check_kind(kind)?;
        Ok(self.min[kind])
    }

    pub fn max(&self, kind: usize) -> Result<u64, ProgrammingError> {
        self.check_kind(kind)?;
        Ok(self.max[kind])
    }

    /// Relative-error-bounded quantile query, `q in [0, 1]`.
    pub fn quantile(&self, kind: usize, q: f64) -> Result<u64, ProgrammingError> {
        self.check_kind(kind)?;

        let count = self.exec_count[kind];
        if count == 0 {
            return Ok(0);
        }
        if q <= 0.0 {
            return Ok(self.min[kind]);
        }
        if q >= 1.0 {
            return Ok(self.max[kind]);
        }

        let bound = (q * ((count - 1) as f64)).floor() as u64;
        let mut running: u64 = 0;
        for (i, &c) in self.buckets[kind].iter().enumerate() {
            running += c as u64;
            if running > bound {
                return Ok(bin_midpoint(i));
            }
        }
        // Every sample is accounted for in the loop above; unreachable in
        // practice, but fall back to max rather than panic on a rounding edge.
        Ok(self.max[kind])
    }

    pub fn total_exec_count(&self) -> u64 {
        self.total_exec_count
    }

    pub fn total_exec_time_nano(&self) -> u64 {
        self.total_exec_time_nano
    }

    /// Merges `other` into `self`: element-wise bucket/count addition, min of
    /// mins, max of maxes. Fails if the two sketches were built with
    /// different `total_kinds`.
    pub fn merge(&mut self, other: &Sketch) -> Result<(), ProgrammingError> {
        if self.total_kinds != other.total_kinds {
            return Err(ProgrammingError::ShapeMismatch {
                lhs: self.total_kinds,
                rhs: other.total_kinds,
            });
        }

        self.total_exec_count += other.total_exec_count;
        self.total_exec_time_nano += other.total_exec_time_nano;

        for k in 0..self.total_kinds {
            self.min[k] = self.min[k].min(other.min[k]);
            self.max[k] = self.max[k].max(other.max[k]);
            self.exec_count[k] += other.exec_count[k];
            for i in 0..BIN_COUNT {
                self.buckets[k][i] += other.buckets[k][i];
            }
        }

        Ok(())
    }
}
