//! CPU-bound workers: generate random numbers and XOR them together in a
//! tight loop, with no suspension point unless a yield policy asks for one.
use futures::future::try_join_all;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::ProbeError;

/// Iterations between cooperative yields when yielding is enabled.
pub const YIELD_EVERY: u64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldPolicy {
    Never,
    Every(u64),
}

impl YieldPolicy {
    pub fn from_flag(enabled: bool, every: u64) -> Self {
        if enabled {
            YieldPolicy::Every(every)
        } else {
            YieldPolicy::Never
        }
    }

    /// Iteration zero counts, so a yielding worker yields once before it
    /// starts.
    #[inline]
    pub fn should_yield(&self, iteration: u64) -> bool {
        match *self {
            YieldPolicy::Never => false,
            YieldPolicy::Every(n) => n > 0 && iteration % n == 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub iterations: u64,
    pub yield_policy: YieldPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSeed {
    /// Starting value of the accumulator.
    pub initial: u64,
    /// Seed of the worker's private generator.
    pub rng_seed: u64,
}

impl WorkerSeed {
    /// Draws `count` seeds from a master generator. A fixed `master` makes
    /// the whole run reproducible.
    pub fn derive(count: usize, master: Option<u64>) -> Vec<WorkerSeed> {
        let mut rng = match master {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        (0..count)
            .map(|_| WorkerSeed {
                initial: rng.gen(),
                rng_seed: rng.gen(),
            })
            .collect()
    }
}

/// The tight loop. Only awaits when the policy asks for a yield.
pub async fn burn(seed: WorkerSeed, iterations: u64, policy: YieldPolicy) -> u64 {
    let mut rng = StdRng::seed_from_u64(seed.rng_seed);
    let mut acc = seed.initial;
    for i in 0..iterations {
        if policy.should_yield(i) {
            tokio::task::yield_now().await;
        }
        acc ^= rng.gen::<u64>();
    }
    acc
}

/// Spawns `config.concurrency` tasks seeded from `master` and waits for
/// every one of them. Accumulators come back in the order of
/// [`WorkerSeed::derive`].
pub async fn run_workers(
    config: &WorkerConfig,
    master: Option<u64>,
) -> Result<Vec<u64>, ProbeError> {
    let seeds = WorkerSeed::derive(config.concurrency, master);
    let handles = seeds.into_iter().map(|seed| {
        let iterations = config.iterations;
        let policy = config.yield_policy;
        tokio::spawn(burn(seed, iterations, policy))
    });
    let vals = try_join_all(handles).await?;
    Ok(vals)
}
