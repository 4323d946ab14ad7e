//! Printed output formats (spec §6).
//!
//! Four forms: text/CSV crossed with throughput/latency. Kinds with no
//! recorded samples are omitted from latency output entirely (spec §8
//! scenario 5).

use crate::sketch::Sketch;

/// `exec_count / ((total_exec_time_nano / thread_count) / 1e9)`, the
/// per-worker-averaged throughput (spec §6). Guards the empty-iterator case
/// (spec §8 "Boundary behaviors") by returning 0 instead of dividing by zero.
pub fn throughput_ops_per_sec(sketch: &Sketch, thread_count: usize) -> f64 {
    let total_nano = sketch.total_exec_time_nano();
    if total_nano == 0 || thread_count == 0 {
        return 0.0;
    }
    let avg_seconds = (total_nano as f64 / thread_count as f64) / 1e9;
    if avg_seconds <= 0.0 {
        return 0.0;
    }
    sketch.total_exec_count() as f64 / avg_seconds
}

pub fn format_throughput_text(ops_per_sec: f64) -> String {
    format!("Throughput [OPS/s]: {}", ops_per_sec)
}

pub fn format_throughput_csv(ops_per_sec: f64) -> String {
    format!("{}", ops_per_sec)
}

/// Text mode latency table: a header, then per kind with samples an
/// ` OPS ID <id>:` line followed by one `  <pct>:  <ns>` line per quantile.
pub fn format_latency_text(sketch: &Sketch, percentiles: &[f64]) -> String {
    let mut out = String::from("Percentile Latency [ns]:\n");
    for kind in 0..sketch.total_kinds() {
        if !sketch.has_samples(kind) {
            continue;
        }
        out.push_str(&format!(" OPS ID {}:\n", kind));
        for &q in percentiles {
            let ns = sketch.quantile(kind, q).expect("kind validated by has_samples above");
            let pct = 100.0 * q;
            out.push_str(&format!("  {:>6.2}:  {:>12}\n", pct, ns));
        }
    }
    out
}

/// CSV mode latency: `<id>,<q>,<ns>` for every (kind, quantile) pair, kinds
/// with no samples omitted.
pub fn format_latency_csv(sketch: &Sketch, percentiles: &[f64]) -> String {
    let mut out = String::new();
    for kind in 0..sketch.total_kinds() {
        if !sketch.has_samples(kind) {
            continue;
        }
        for &q in percentiles {
            let ns = sketch.quantile(kind, q).expect("kind validated by has_samples above");
            out.push_str(&format!("{},{},{}\n", kind, q, ns));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_zero_when_no_time_recorded() {
        let sketch = Sketch::new(1);
        assert_eq!(throughput_ops_per_sec(&sketch, 4), 0.0);
    }

    #[test]
    fn throughput_matches_scenario_2() {
        // 1000 ops total, 100 ns each, two threads, 500 ops each.
        let mut sketch = Sketch::new(1);
        for _ in 0..1000 {
            sketch.add(0, 1, 100).unwrap();
        }
        let ops = throughput_ops_per_sec(&sketch, 2);
        assert!((ops - 1e8).abs() / 1e8 < 0.02, "ops={ops}");
    }

    #[test]
    fn csv_latency_has_exactly_four_lines_for_scenario_5() {
        let mut sketch = Sketch::new(3);
        for _ in 0..300 {
            sketch.add(0, 1, 50).unwrap();
        }
        for _ in 0..700 {
            sketch.add(1, 1, 200).unwrap();
        }
        let csv = format_latency_csv(&sketch, &[0.5, 0.99]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("0,0.5,"));
        assert!(lines[1].starts_with("0,0.99,"));
        assert!(lines[2].starts_with("1,0.5,"));
        assert!(lines[3].starts_with("1,0.99,"));
    }

    #[test]
    fn text_latency_omits_kinds_without_samples() {
        let mut sketch = Sketch::new(2);
        sketch.add(0, 1, 10).unwrap();
        let text = format_latency_text(&sketch, &[0.5]);
        assert!(text.contains("OPS ID 0"));
        assert!(!text.contains("OPS ID 1"));
    }
}
