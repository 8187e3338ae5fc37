//! Joins a gossip member list, logging every membership callback, then runs
//! the CPU workers after a warm-up to see whether gossip traffic survives
//! them. Start a few nodes pointing at each other:
//!
//! ```text
//! simberlist --name a --port 7946
//! simberlist --name b --port 7947 --seeds 127.0.0.1:7946
//! ```
mod gossip;
mod membership;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use probe::duration::parse_std;
use probe::worker::{run_workers, WorkerConfig, YieldPolicy};
use structopt::StructOpt;
use tracing::info;

use crate::gossip::{Gossip, GossipConfig};
use crate::membership::{Delegate, EventDelegate, Membership, Node};

#[derive(Debug, StructOpt)]
#[structopt(name = "simberlist", about = "CPU workers vs gossip membership")]
struct Opt {
    /// Member list name [default: node-<port>]
    #[structopt(long)]
    name: Option<String>,
    /// Port to bind
    #[structopt(long, default_value = "7946")]
    port: u16,
    /// Address to bind
    #[structopt(long, default_value = "0.0.0.0")]
    bind: IpAddr,
    /// Seeds to join, repeatable or comma separated
    #[structopt(long, use_delimiter = true)]
    seeds: Vec<String>,
    /// Number of CPU workers to spawn [default: number of CPUs]
    #[structopt(long)]
    concurrency: Option<usize>,
    /// Number of times each worker loops
    #[structopt(long, default_value = "1099511627776")]
    iterations: u64,
    /// Insert cooperative yields into the CPU loop
    #[structopt(long = "yield")]
    yield_now: bool,
    #[structopt(long, default_value = "10000000")]
    yield_every: u64,
    /// How long to gossip before the workers start
    #[structopt(long, default_value = "10s", parse(try_from_str = parse_std))]
    warmup: Duration,
    #[structopt(long)]
    seed: Option<u64>,
    /// Runtime worker threads [default: number of CPUs]
    #[structopt(long)]
    threads: Option<usize>,
}

impl Opt {
    fn node_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("node-{}", self.port))
    }

    fn gossip(&self) -> GossipConfig {
        let mut config = GossipConfig::wan(self.node_name());
        config.bind_addr = self.bind;
        config.bind_port = self.port;
        config
    }

    fn workers(&self) -> WorkerConfig {
        WorkerConfig {
            concurrency: self.concurrency.unwrap_or_else(probe::num_cpus),
            iterations: self.iterations,
            yield_policy: YieldPolicy::from_flag(self.yield_now, self.yield_every),
        }
    }
}

struct LoggingDelegate {
    name: String,
}

impl Delegate for LoggingDelegate {
    fn node_meta(&self, limit: usize) -> Vec<u8> {
        info!("{:>4} {:>12} {}", self.name, "NodeMeta", limit);
        format!("{}Meta", self.name).into_bytes()
    }

    fn notify_msg(&self, msg: &[u8]) {
        info!(
            "{:>4} {:>12} {}",
            self.name,
            "NotifyMsg",
            String::from_utf8_lossy(msg)
        );
    }

    fn get_broadcasts(&self, _overhead: usize, _limit: usize) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn local_state(&self, join: bool) -> Vec<u8> {
        info!("{:>4} {:>12} {}", self.name, "LocalState", join);
        self.name.clone().into_bytes()
    }

    fn merge_remote_state(&self, buf: &[u8], join: bool) {
        info!(
            "{:>4} {:>12} {} {}",
            self.name,
            "MergeRemoteState",
            join,
            String::from_utf8_lossy(buf)
        );
    }
}

struct LoggingEvents {
    name: String,
}

impl LoggingEvents {
    fn log(&self, event: &str, node: &Node) {
        info!(
            "{:>4} {:>6} {:>4} {:>12} {}",
            self.name,
            event,
            node.name,
            node.addr.ip(),
            node.port()
        );
    }
}

impl EventDelegate for LoggingEvents {
    fn notify_join(&self, node: &Node) {
        self.log("Join", node);
    }

    fn notify_leave(&self, node: &Node) {
        self.log("Leave", node);
    }

    fn notify_update(&self, node: &Node) {
        self.log("Update", node);
    }
}

async fn run(opt: &Opt) -> eyre::Result<Vec<u64>> {
    let name = opt.node_name();
    let list = Gossip::create(
        opt.gossip(),
        Arc::new(LoggingDelegate { name: name.clone() }),
        Arc::new(LoggingEvents { name }),
    )
    .await
    .wrap_err("creating memberlist")?;
    let contacted = list.join(&opt.seeds).await.wrap_err("joining memberlist")?;
    let members: Vec<String> = list.members().into_iter().map(|n| n.name).collect();
    info!(
        name = %list.local_node().name,
        addr = %list.local_addr(),
        contacted,
        ?members,
        "joined"
    );

    tokio::time::sleep(opt.warmup).await;
    info!("starting workers");
    let workers = opt.workers();
    let vals = run_workers(&workers, opt.seed).await?;

    list.leave().await.wrap_err("leaving memberlist")?;
    Ok(vals)
}

fn main() -> eyre::Result<()> {
    probe::logging::init();
    let opt = Opt::from_args();
    info!("{:?}", opt);
    let rt = probe::runtime(opt.threads.unwrap_or_else(probe::num_cpus))?;
    let vals = rt.block_on(run(&opt))?;
    println!("{:?}", vals);
    Ok(())
}
