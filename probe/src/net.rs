//! Background I/O tasks. Each one loops until shut down, printing `1`, `2`
//! and `3` to stdout as it moves through an iteration, so a stalled probe is
//! visible at a glance.
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::shutdown::{Shutdown, Trigger};
use crate::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// GET a URL and read the whole body.
    Http,
    /// Only sleeps between status characters. Does not starve.
    Sleep,
}

#[derive(Debug, Clone)]
pub struct NetProbeConfig {
    pub url: String,
    pub kind: ProbeKind,
    pub count: usize,
    /// Pause after each completed iteration.
    pub sleep: Duration,
    /// Pause after a transport error.
    pub error_sleep: Duration,
    /// Bodies larger than this are logged.
    pub huge_body: usize,
}

impl Default for NetProbeConfig {
    fn default() -> Self {
        Self {
            url: "http://google.com".to_string(),
            kind: ProbeKind::Http,
            count: 1,
            sleep: Duration::from_millis(100),
            error_sleep: Duration::from_millis(500),
            huge_body: 100_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProbeStats {
    requests: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl ProbeStats {
    /// Completed iterations.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Transport errors.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

pub struct NetProbes {
    handles: Vec<JoinHandle<()>>,
    stats: ProbeStats,
}

impl NetProbes {
    pub fn stats(&self) -> ProbeStats {
        self.stats.clone()
    }

    /// Fires the shutdown and waits for every probe to return.
    pub async fn stop(self, trigger: Trigger) -> ProbeStats {
        trigger.fire();
        self.join().await
    }

    pub async fn join(self) -> ProbeStats {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("net probe task failed: {}", e);
            }
        }
        self.stats
    }
}

pub fn spawn_net_probes(
    config: &NetProbeConfig,
    shutdown: Shutdown,
) -> Result<NetProbes, ProbeError> {
    let client = Client::builder().build()?;
    let stats = ProbeStats::default();
    let handles = (0..config.count)
        .map(|id| {
            let probe = NetProbe {
                id,
                client: client.clone(),
                config: config.clone(),
                stats: stats.clone(),
            };
            tokio::spawn(probe.run(shutdown.clone()))
        })
        .collect();
    Ok(NetProbes { handles, stats })
}

struct NetProbe {
    id: usize,
    client: Client,
    config: NetProbeConfig,
    stats: ProbeStats,
}

impl NetProbe {
    async fn run(self, mut shutdown: Shutdown) {
        debug!(probe = self.id, url = %self.config.url, "net probe started");
        loop {
            let body = async {
                match self.config.kind {
                    ProbeKind::Http => self.http_once().await,
                    ProbeKind::Sleep => self.sleep_once().await,
                }
            };
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = body => {}
            }
        }
        debug!(probe = self.id, "net probe stopped");
    }

    async fn http_once(&self) {
        status('1');
        let resp = match self.client.get(&self.config.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("making http request: {}", e);
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(self.config.error_sleep).await;
                return;
            }
        };
        if resp.status() != StatusCode::OK {
            warn!("unexpected status: {}", resp.status());
        }
        status('2');
        match resp.bytes().await {
            Ok(body) if body.len() > self.config.huge_body => {
                warn!("huge response body: {}", body.len());
            }
            Ok(_) => {}
            Err(e) => warn!("err reading body: {}", e),
        }
        status('3');
        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.config.sleep).await;
    }

    async fn sleep_once(&self) {
        status('1');
        tokio::time::sleep(Duration::from_millis(1)).await;
        status('2');
        tokio::time::sleep(Duration::from_millis(2)).await;
        status('3');
        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.config.sleep).await;
    }
}

fn status(c: char) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{}", c);
    let _ = out.flush();
}
