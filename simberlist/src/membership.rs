//! What the demo needs from a membership layer, independent of how the
//! layer talks to its peers.
use std::net::SocketAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub addr: SocketAddr,
    pub meta: Vec<u8>,
}

impl Node {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Hooks into the data a node exchanges with its peers.
pub trait Delegate: Send + Sync + 'static {
    /// Metadata advertised for the local node, at most `limit` bytes.
    fn node_meta(&self, limit: usize) -> Vec<u8>;

    /// A user message arrived from a peer.
    fn notify_msg(&self, msg: &[u8]);

    /// Pending user messages to gossip. Each message should fit in `limit`
    /// bytes once `overhead` bytes of framing are added.
    fn get_broadcasts(&self, overhead: usize, limit: usize) -> Vec<Vec<u8>>;

    /// State sent to a peer during a full state exchange.
    fn local_state(&self, join: bool) -> Vec<u8>;

    /// State received from a peer during a full state exchange.
    fn merge_remote_state(&self, buf: &[u8], join: bool);
}

/// Membership changes.
pub trait EventDelegate: Send + Sync + 'static {
    fn notify_join(&self, node: &Node);
    fn notify_leave(&self, node: &Node);
    fn notify_update(&self, node: &Node);
}

#[async_trait]
pub trait Membership: Send + Sync {
    /// Contacts every seed and returns how many answered. Fails only when
    /// seeds were given and none of them answered.
    async fn join(&self, seeds: &[String]) -> Result<usize, MembershipError>;

    fn local_node(&self) -> Node;

    /// Known remote members.
    fn members(&self) -> Vec<Node>;

    /// Re-reads the local metadata and pushes it to the cluster.
    async fn update_node(&self) -> Result<(), MembershipError>;

    /// Announces departure and stops all background work.
    async fn leave(&self) -> Result<(), MembershipError>;
}

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("binding {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resolving {seed}: {source}")]
    Resolve {
        seed: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no address for {0}")]
    NoAddress(String),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding packet: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("failed to join any of {seeds:?}: {last}")]
    JoinFailed {
        seeds: Vec<String>,
        #[source]
        last: Box<MembershipError>,
    },
    #[error("member list has shut down")]
    Shutdown,
}
