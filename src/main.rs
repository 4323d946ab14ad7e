//! threadbench CLI (spec §6.2).
//!
//! Wires the flag table onto `Config`, runs the demo `AtomicCounterTarget` /
//! `RoundRobinEngine` pair through a `Runner`, and prints a text or CSV
//! report. Grounded on the teacher's CLI conventions (clap derive, an
//! `env_logger` sink initialized once at startup, distinct process exit
//! codes per error class) as seen across the rest of the example pack.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use threadbench::config::{default_percentiles, parse_quantile_list, parse_seed, Config};
use threadbench::demo::{AtomicCounterTarget, RoundRobinEngine};
use threadbench::error::{ConfigError, RunError};
use threadbench::output::{
    format_latency_csv, format_latency_text, format_throughput_csv, format_throughput_text,
    throughput_ops_per_sec,
};
use threadbench::runner::{RunOutcome, Runner};

#[derive(Parser, Debug)]
#[command(name = "threadbench", about = "Coordinated multi-threaded micro-benchmark harness")]
struct Cli {
    /// Number of worker threads to run concurrently.
    #[arg(long = "thread-num", default_value_t = 1)]
    thread_num: usize,

    /// Root RNG seed (u64). Empty means seed from OS entropy.
    #[arg(long = "random-seed", default_value = "")]
    random_seed: String,

    /// Print an aggregate throughput line.
    #[arg(long = "throughput", default_value_t = false)]
    throughput: bool,

    /// Print output as CSV instead of human-readable text.
    #[arg(long = "csv", default_value_t = false)]
    csv: bool,

    /// Maximum run duration in seconds.
    #[arg(long = "timeout", default_value_t = 10.0)]
    timeout: f64,

    /// Comma-separated quantiles in [0, 1]. Empty means the built-in default list.
    #[arg(long = "target-latency", default_value = "")]
    target_latency: String,

    /// Bias of the demo engine's write/read mix; consumed only by `RoundRobinEngine`.
    #[arg(long = "skew-parameter", default_value_t = 0.0)]
    skew_parameter: f64,
}

fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let max_threads = num_cpus::get() * 4;
    if cli.thread_num == 0 {
        return Err(ConfigError::ZeroThreads(cli.thread_num));
    }
    if cli.thread_num > max_threads {
        return Err(ConfigError::TooManyThreads(cli.thread_num, max_threads));
    }

    let random_seed = parse_seed(&cli.random_seed)?;

    if cli.timeout <= 0.0 {
        return Err(ConfigError::NonPositiveTimeout(cli.timeout));
    }

    let target_percentiles = if cli.target_latency.trim().is_empty() {
        default_percentiles()
    } else {
        parse_quantile_list(&cli.target_latency)?
    };

    if cli.skew_parameter < 0.0 {
        return Err(ConfigError::NegativeSkew(cli.skew_parameter));
    }

    Ok(Config {
        thread_count: cli.thread_num,
        measure_throughput: cli.throughput,
        output_csv: cli.csv,
        timeout: Duration::from_secs_f64(cli.timeout),
        random_seed,
        target_percentiles,
    })
}

fn print_report(outcome: &RunOutcome, config: &Config, csv: bool) {
    let sketch = outcome.sketch();

    if config.measure_throughput {
        let ops = throughput_ops_per_sec(sketch, config.thread_count);
        if csv {
            println!("{}", format_throughput_csv(ops));
        } else {
            println!("{}", format_throughput_text(ops));
        }
    }

    if csv {
        print!("{}", format_latency_csv(sketch, &config.target_percentiles));
    } else {
        print!("{}", format_latency_text(sketch, &config.target_percentiles));
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("configuration rejected: {err}");
            return ExitCode::from(1);
        }
    };

    info!("starting run: thread_count={} timeout={:?}", config.thread_count, config.timeout);

    let target = AtomicCounterTarget::new();
    let engine = RoundRobinEngine::new(cli.skew_parameter);

    let runner = match Runner::new(config.clone(), &target, &engine) {
        Ok(runner) => runner,
        Err(err) => {
            error!("configuration rejected: {err}");
            return ExitCode::from(1);
        }
    };

    match runner.run() {
        Ok(outcome) => {
            if outcome.timed_out() {
                info!("run timed out; reporting partial results");
            }
            print_report(&outcome, &config, config.output_csv);
            ExitCode::from(0)
        }
        Err(RunError::Configuration(err)) => {
            error!("configuration rejected: {err}");
            ExitCode::from(1)
        }
        Err(err @ (RunError::Programming(_) | RunError::Worker(_))) => {
            error!("run aborted: {err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            thread_num: 2,
            random_seed: String::new(),
            throughput: true,
            csv: false,
            timeout: 1.0,
            target_latency: String::new(),
            skew_parameter: 0.0,
        }
    }

    #[test]
    fn build_config_accepts_defaults() {
        let cli = base_cli();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.thread_count, 2);
        assert_eq!(config.target_percentiles, default_percentiles());
    }

    #[test]
    fn build_config_rejects_zero_threads() {
        let mut cli = base_cli();
        cli.thread_num = 0;
        assert_eq!(build_config(&cli).unwrap_err(), ConfigError::ZeroThreads(0));
    }

    #[test]
    fn build_config_rejects_negative_skew() {
        let mut cli = base_cli();
        cli.skew_parameter = -1.0;
        assert_eq!(build_config(&cli).unwrap_err(), ConfigError::NegativeSkew(-1.0));
    }

    #[test]
    fn build_config_parses_custom_quantile_list() {
        let mut cli = base_cli();
        cli.target_latency = "0.5,0.9".to_string();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.target_percentiles, vec![0.5, 0.9]);
    }

    #[test]
    fn build_config_rejects_thread_num_above_ceiling() {
        let mut cli = base_cli();
        cli.thread_num = num_cpus::get() * 4 + 1;
        assert!(matches!(build_config(&cli), Err(ConfigError::TooManyThreads(_, _))));
    }
}
