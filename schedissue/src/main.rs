//! Shows how a few CPU-bound tasks that never yield can starve other tasks
//! on a multi-threaded runtime.
//!
//! Starts a configurable number of tasks making periodic HTTP requests,
//! sleeps for the warm-up so a few requests complete, then launches
//! `--concurrency` workers generating and XORing random numbers in a tight
//! loop. Watch the `123` heartbeat on stdout stop once the workers start,
//! and come back with `--yield`.
use std::time::Duration;

use eyre::WrapErr;
use probe::duration::parse_std;
use probe::experiment::{self, ExperimentConfig};
use probe::net::{NetProbeConfig, ProbeKind};
use probe::worker::{WorkerConfig, YieldPolicy};
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "schedissue", about = "CPU workers vs periodic HTTP requests")]
struct Opt {
    /// Number of CPU workers to spawn [default: number of CPUs]
    #[structopt(long)]
    concurrency: Option<usize>,
    /// Number of times each worker loops
    #[structopt(long, default_value = "1099511627776")]
    iterations: u64,
    /// Insert cooperative yields into the CPU loop
    #[structopt(long = "yield")]
    yield_now: bool,
    /// Iterations between yields
    #[structopt(long, default_value = "10000000")]
    yield_every: u64,
    /// Number of tasks making periodic HTTP requests
    #[structopt(long, default_value = "1")]
    http_count: usize,
    /// Sleep between HTTP requests
    #[structopt(long, default_value = "100ms", parse(try_from_str = parse_std))]
    http_sleep: Duration,
    /// Sleep after a failed HTTP request
    #[structopt(long, default_value = "500ms", parse(try_from_str = parse_std))]
    error_sleep: Duration,
    #[structopt(long, default_value = "http://google.com")]
    url: String,
    /// How long the HTTP tasks run before the workers start
    #[structopt(long, default_value = "4s", parse(try_from_str = parse_std))]
    warmup: Duration,
    /// Master seed for the workers' generators
    #[structopt(long)]
    seed: Option<u64>,
    /// Runtime worker threads [default: number of CPUs]
    #[structopt(long)]
    threads: Option<usize>,
}

impl Opt {
    fn experiment(&self) -> ExperimentConfig {
        ExperimentConfig {
            probes: NetProbeConfig {
                url: self.url.clone(),
                kind: ProbeKind::Http,
                count: self.http_count,
                sleep: self.http_sleep,
                error_sleep: self.error_sleep,
                huge_body: 100_000,
            },
            workers: WorkerConfig {
                concurrency: self.concurrency.unwrap_or_else(probe::num_cpus),
                iterations: self.iterations,
                yield_policy: YieldPolicy::from_flag(self.yield_now, self.yield_every),
            },
            warmup: self.warmup,
            seed: self.seed,
        }
    }
}

fn main() -> eyre::Result<()> {
    probe::logging::init();
    let opt = Opt::from_args();
    info!("{:?}", opt);

    let threads = opt.threads.unwrap_or_else(probe::num_cpus);
    let rt = probe::runtime(threads)?;
    let config = opt.experiment();
    let vals = rt
        .block_on(experiment::run(&config))
        .wrap_err("running workers")?;

    // Printing the accumulators keeps the loop from being optimized away.
    println!("{:?}", vals);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_run() {
        let opt = Opt::from_iter(["schedissue"]);
        let config = opt.experiment();
        assert_eq!(config.workers.iterations, 1 << 40);
        assert_eq!(config.workers.yield_policy, YieldPolicy::Never);
        assert_eq!(config.probes.count, 1);
        assert_eq!(config.probes.sleep, Duration::from_millis(100));
        assert_eq!(config.warmup, Duration::from_secs(4));
        assert_eq!(config.workers.concurrency, probe::num_cpus());
    }

    #[test]
    fn go_style_durations_and_yield_flag() {
        let opt = Opt::from_iter([
            "schedissue",
            "--yield",
            "--yield-every",
            "1000",
            "--http-sleep",
            "1m30s",
            "--warmup",
            "0",
            "--concurrency",
            "3",
        ]);
        let config = opt.experiment();
        assert_eq!(config.workers.yield_policy, YieldPolicy::Every(1000));
        assert_eq!(config.probes.sleep, Duration::from_secs(90));
        assert_eq!(config.warmup, Duration::ZERO);
        assert_eq!(config.workers.concurrency, 3);
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(Opt::from_iter_safe(["schedissue", "--warmup", "4"]).is_err());
        assert!(Opt::from_iter_safe(["schedissue", "--http-sleep", "-1s"]).is_err());
    }
}
