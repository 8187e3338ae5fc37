//! Minimal reproduction of CPU-bound work starving an I/O task.
//!
//! One task makes periodic HTTP requests. After the warm-up a second task
//! generates and XORs random numbers in a tight loop on a runtime worker
//! thread. With `--threads 1` the two share one thread, and yielding every
//! ten million iterations (`--yield`) lets the HTTP task keep going.
use std::time::Duration;

use eyre::WrapErr;
use probe::duration::parse_std;
use probe::net::{spawn_net_probes, NetProbeConfig, ProbeKind};
use probe::shutdown;
use probe::worker::{burn, WorkerSeed, YieldPolicy, YIELD_EVERY};
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "schedmin", about = "One HTTP task vs one CPU loop")]
struct Opt {
    /// Insert cooperative yields into the CPU loop
    #[structopt(long = "yield")]
    yield_now: bool,
    #[structopt(long, default_value = "1099511627776")]
    iterations: u64,
    #[structopt(long, default_value = "http://golang.org/")]
    url: String,
    /// Replace the HTTP request with plain sleeps (does not reproduce)
    #[structopt(long)]
    sleep_loop: bool,
    #[structopt(long, default_value = "4s", parse(try_from_str = parse_std))]
    warmup: Duration,
    #[structopt(long)]
    seed: Option<u64>,
    /// Runtime worker threads [default: number of CPUs]
    #[structopt(long)]
    threads: Option<usize>,
}

impl Opt {
    fn probe(&self) -> NetProbeConfig {
        NetProbeConfig {
            url: self.url.clone(),
            kind: if self.sleep_loop {
                ProbeKind::Sleep
            } else {
                ProbeKind::Http
            },
            count: 1,
            sleep: Duration::from_millis(300),
            error_sleep: Duration::from_millis(500),
            huge_body: 400_000,
        }
    }
}

async fn run(opt: &Opt) -> eyre::Result<u64> {
    let (trigger, shutdown) = shutdown::channel();
    let probes = spawn_net_probes(&opt.probe(), shutdown).wrap_err("starting http task")?;

    tokio::time::sleep(opt.warmup).await;
    info!("starting work");
    // block_on drives this future off the worker pool, so the loop needs its
    // own task to compete with the HTTP task.
    let seed = WorkerSeed::derive(1, opt.seed)[0];
    let policy = YieldPolicy::from_flag(opt.yield_now, YIELD_EVERY);
    let val = tokio::spawn(burn(seed, opt.iterations, policy))
        .await
        .wrap_err("cpu loop failed")?;

    probes.stop(trigger).await;
    Ok(val)
}

fn main() -> eyre::Result<()> {
    probe::logging::init();
    let opt = Opt::from_args();
    let rt = probe::runtime(opt.threads.unwrap_or_else(probe::num_cpus))?;
    let val = rt.block_on(run(&opt))?;
    println!("{}", val);
    Ok(())
}
