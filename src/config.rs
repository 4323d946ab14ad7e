//! Runner configuration and validation (spec §4.3, §7 `ConfigurationError`).
//!
//! Grounded on the teacher's `src/config/validator.rs`: small, independent
//! `validate_*` functions returning a typed error, called before any
//! measurement work begins.

use std::time::Duration;

use crate::error::ConfigError;

/// Default percentile list from spec §4.3.
pub fn default_percentiles() -> Vec<f64> {
    vec![0.0, 0.25, 0.50, 0.75, 0.90, 0.95, 0.99, 0.999, 0.9999, 1.0]
}

/// Runner configuration (spec §4.3 "Configuration").
#[derive(Debug, Clone)]
pub struct Config {
    pub thread_count: usize,
    pub measure_throughput: bool,
    pub output_csv: bool,
    pub timeout: Duration,
    pub random_seed: Option<u64>,
    pub target_percentiles: Vec<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            thread_count: 1,
            measure_throughput: true,
            output_csv: false,
            timeout: Duration::from_secs(10),
            random_seed: None,
            target_percentiles: default_percentiles(),
        }
    }
}

/// Validates a `Config` built from user input (CLI flags or otherwise).
/// Rejected values are reported before `Runner::run` is ever called
/// (spec §7 `ConfigurationError`).
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.thread_count == 0 {
        return Err(ConfigError::ZeroThreads(config.thread_count));
    }
    if config.timeout.as_secs_f64() <= 0.0 {
        return Err(ConfigError::NonPositiveTimeout(config.timeout.as_secs_f64()));
    }
    for &q in &config.target_percentiles {
        if !(0.0..=1.0).contains(&q) {
            return Err(ConfigError::QuantileOutOfRange(q));
        }
    }
    Ok(())
}

/// Parses a comma-separated quantile list (CLI `--target-latency`). An empty
/// string yields the spec §4.3 default list.
pub fn parse_quantile_list(raw: &str) -> Result<Vec<f64>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(default_percentiles());
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::MalformedQuantileList(raw.to_string()))
        })
        .collect()
}

/// Parses the `--random-seed` flag: empty string means "seed from OS
/// entropy" (`Ok(None)`), otherwise it must parse as a `u64`.
pub fn parse_seed(raw: &str) -> Result<Option<u64>, ConfigError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u64>().map(Some).map_err(|_| ConfigError::InvalidSeed(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_rejected() {
        let mut config = Config::default();
        config.thread_count = 0;
        assert_eq!(validate(&config).unwrap_err(), ConfigError::ZeroThreads(0));
    }

    #[test]
    fn out_of_range_quantile_rejected() {
        let mut config = Config::default();
        config.target_percentiles = vec![0.5, 1.5];
        assert_eq!(validate(&config).unwrap_err(), ConfigError::QuantileOutOfRange(1.5));
    }

    #[test]
    fn non_positive_timeout_rejected() {
        let mut config = Config::default();
        config.timeout = Duration::from_secs(0);
        assert_eq!(validate(&config).unwrap_err(), ConfigError::NonPositiveTimeout(0.0));
    }

    #[test]
    fn empty_seed_means_os_entropy() {
        assert_eq!(parse_seed("").unwrap(), None);
    }

    #[test]
    fn numeric_seed_parses() {
        assert_eq!(parse_seed("42").unwrap(), Some(42));
    }

    #[test]
    fn non_numeric_seed_rejected() {
        assert!(parse_seed("not-a-number").is_err());
    }

    #[test]
    fn empty_quantile_list_uses_default() {
        assert_eq!(parse_quantile_list("").unwrap(), default_percentiles());
    }

    #[test]
    fn quantile_list_parses_comma_separated_values() {
        assert_eq!(parse_quantile_list("0.5, 0.99").unwrap(), vec![0.5, 0.99]);
    }
}
