use std::time::Duration;

use tracing::info;

use crate::net::{spawn_net_probes, NetProbeConfig};
use crate::shutdown;
use crate::worker::{run_workers, WorkerConfig};
use crate::ProbeError;

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub probes: NetProbeConfig,
    pub workers: WorkerConfig,
    /// How long the probes run alone before the workers start.
    pub warmup: Duration,
    /// Master seed for the workers. `None` draws one from entropy.
    pub seed: Option<u64>,
}

/// Starts the probes, lets them run for the warm-up, then runs the CPU
/// workers to completion. Probes are stopped before returning the
/// accumulators.
pub async fn run(config: &ExperimentConfig) -> Result<Vec<u64>, ProbeError> {
    let (trigger, shutdown) = shutdown::channel();
    let probes = spawn_net_probes(&config.probes, shutdown)?;

    tokio::time::sleep(config.warmup).await;
    info!(
        concurrency = config.workers.concurrency,
        iterations = config.workers.iterations,
        "starting workers"
    );
    let vals = run_workers(&config.workers, config.seed).await;

    let stats = probes.stop(trigger).await;
    info!(
        requests = stats.requests(),
        failures = stats.failures(),
        "probes stopped"
    );
    vals
}
