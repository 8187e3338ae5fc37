//! A small gossip membership layer over UDP.
//!
//! Nodes exchange their full member lists (push-pull) on join and
//! periodically afterwards, ping a random member every probe interval, and
//! forget members that stay silent for `probe_interval * suspicion_mult`.
//! Delegate broadcasts are forwarded to a few random members every gossip
//! interval. Packets are JSON documents, one per datagram.
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use probe::shutdown::{self, Shutdown, Trigger};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::membership::{Delegate, EventDelegate, Membership, MembershipError, Node};

/// Largest datagram we send or accept.
const MAX_PACKET: usize = 65_507;
/// Upper bound on delegate metadata.
pub const META_MAX_SIZE: usize = 512;
/// Framing added around a user message.
const USER_MSG_OVERHEAD: usize = 64;
/// Members each gossip round is sent to.
const GOSSIP_NODES: usize = 3;

#[derive(Debug, Clone)]
pub struct GossipConfig {
    pub name: String,
    pub bind_addr: IpAddr,
    /// Zero picks a free port.
    pub bind_port: u16,
    /// Port assumed for seeds given without one.
    pub default_port: u16,
    pub probe_interval: Duration,
    pub push_pull_interval: Duration,
    pub gossip_interval: Duration,
    pub suspicion_mult: u32,
    pub join_timeout: Duration,
}

impl GossipConfig {
    /// Tuned for a local network.
    pub fn lan(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            bind_port: 7946,
            default_port: 7946,
            probe_interval: Duration::from_secs(1),
            push_pull_interval: Duration::from_secs(30),
            gossip_interval: Duration::from_millis(200),
            suspicion_mult: 4,
            join_timeout: Duration::from_secs(10),
        }
    }

    /// Slower timers for links with high latency.
    pub fn wan(name: impl Into<String>) -> Self {
        Self {
            probe_interval: Duration::from_secs(5),
            push_pull_interval: Duration::from_secs(60),
            gossip_interval: Duration::from_millis(500),
            suspicion_mult: 6,
            join_timeout: Duration::from_secs(30),
            ..Self::lan(name)
        }
    }

    pub fn dead_after(&self) -> Duration {
        self.probe_interval * self.suspicion_mult
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeState {
    name: String,
    addr: SocketAddr,
    meta: Vec<u8>,
    incarnation: u64,
}

impl NodeState {
    fn node(&self) -> Node {
        Node {
            name: self.name.clone(),
            addr: self.addr,
            meta: self.meta.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Packet {
    PushPull {
        from: NodeState,
        members: Vec<NodeState>,
        state: Vec<u8>,
        join: bool,
        reply: bool,
    },
    Ping {
        from: String,
        seq: u64,
    },
    Ack {
        from: String,
        seq: u64,
    },
    User {
        from: String,
        msg: Vec<u8>,
    },
    Leave {
        node: NodeState,
    },
}

struct Member {
    state: NodeState,
    last_seen: Instant,
}

#[derive(Default)]
struct Table {
    alive: HashMap<String, Member>,
    /// Incarnation at which a member left or was expired.
    left: HashMap<String, u64>,
}

enum Change {
    Join(Node),
    Update(Node),
    Leave(Node),
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Inner {
    config: GossipConfig,
    socket: UdpSocket,
    local: Mutex<NodeState>,
    table: Mutex<Table>,
    pending_joins: Mutex<HashMap<SocketAddr, oneshot::Sender<()>>>,
    seq: AtomicU64,
    delegate: Arc<dyn Delegate>,
    events: Arc<dyn EventDelegate>,
}

pub struct Gossip {
    inner: Arc<Inner>,
    trigger: Mutex<Option<Trigger>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Gossip {
    /// Binds the socket and starts the background tasks. They stop on
    /// [`Membership::leave`] or when the `Gossip` is dropped.
    pub async fn create(
        config: GossipConfig,
        delegate: Arc<dyn Delegate>,
        events: Arc<dyn EventDelegate>,
    ) -> Result<Gossip, MembershipError> {
        let bind = SocketAddr::new(config.bind_addr, config.bind_port);
        let socket = UdpSocket::bind(bind)
            .await
            .map_err(|source| MembershipError::Bind {
                addr: bind.to_string(),
                source,
            })?;
        let addr = socket.local_addr()?;

        let mut meta = delegate.node_meta(META_MAX_SIZE);
        meta.truncate(META_MAX_SIZE);
        let local = NodeState {
            name: config.name.clone(),
            addr,
            meta,
            incarnation: 0,
        };
        info!(name = %config.name, %addr, "memberlist listening");

        let inner = Arc::new(Inner {
            config,
            socket,
            local: Mutex::new(local),
            table: Mutex::new(Table::default()),
            pending_joins: Mutex::new(HashMap::new()),
            seq: AtomicU64::new(0),
            delegate,
            events,
        });

        let (trigger, shutdown) = shutdown::channel();
        let tasks = vec![
            tokio::spawn(receive_loop(inner.clone(), shutdown.clone())),
            tokio::spawn(probe_loop(inner.clone(), shutdown.clone())),
            tokio::spawn(gossip_loop(inner.clone(), shutdown.clone())),
            tokio::spawn(push_pull_loop(inner.clone(), shutdown)),
        ];
        Ok(Gossip {
            inner,
            trigger: Mutex::new(Some(trigger)),
            tasks: Mutex::new(tasks),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        lock(&self.inner.local).addr
    }
}

#[async_trait]
impl Membership for Gossip {
    async fn join(&self, seeds: &[String]) -> Result<usize, MembershipError> {
        let mut joined = 0;
        let mut last = None;
        for seed in seeds {
            match self.inner.join_one(seed).await {
                Ok(()) => joined += 1,
                Err(e) => {
                    warn!(%seed, "join failed: {}", e);
                    last = Some(e);
                }
            }
        }
        match last {
            Some(e) if joined == 0 => Err(MembershipError::JoinFailed {
                seeds: seeds.to_vec(),
                last: Box::new(e),
            }),
            _ => Ok(joined),
        }
    }

    fn local_node(&self) -> Node {
        lock(&self.inner.local).node()
    }

    fn members(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = lock(&self.inner.table)
            .alive
            .values()
            .map(|m| m.state.node())
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    async fn update_node(&self) -> Result<(), MembershipError> {
        {
            let mut local = lock(&self.inner.local);
            let mut meta = self.inner.delegate.node_meta(META_MAX_SIZE);
            meta.truncate(META_MAX_SIZE);
            local.meta = meta;
            local.incarnation += 1;
        }
        for node in self.members() {
            self.inner.send_push_pull(node.addr, false, false).await?;
        }
        Ok(())
    }

    async fn leave(&self) -> Result<(), MembershipError> {
        let trigger = lock(&self.trigger).take();
        let Some(trigger) = trigger else {
            return Err(MembershipError::Shutdown);
        };
        let packet = Packet::Leave {
            node: lock(&self.inner.local).clone(),
        };
        for node in self.members() {
            if let Err(e) = self.inner.send(node.addr, &packet).await {
                warn!(member = %node.name, "sending leave: {}", e);
            }
        }
        trigger.fire();
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        for task in tasks {
            if let Err(e) = task.await {
                warn!("memberlist task failed: {}", e);
            }
        }
        info!(name = %self.inner.config.name, "left memberlist");
        Ok(())
    }
}

impl Inner {
    async fn join_one(&self, seed: &str) -> Result<(), MembershipError> {
        let addr = self.resolve(seed).await?;
        let (tx, rx) = oneshot::channel();
        lock(&self.pending_joins).insert(addr, tx);
        if let Err(e) = self.send_push_pull(addr, true, false).await {
            lock(&self.pending_joins).remove(&addr);
            return Err(e);
        }
        match tokio::time::timeout(self.config.join_timeout, rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(MembershipError::Shutdown),
            Err(_) => {
                lock(&self.pending_joins).remove(&addr);
                Err(MembershipError::Timeout(seed.to_string()))
            }
        }
    }

    /// Accepts `ip:port`, `host:port`, or a bare host on the default port.
    async fn resolve(&self, seed: &str) -> Result<SocketAddr, MembershipError> {
        if let Ok(addr) = seed.parse::<SocketAddr>() {
            return Ok(addr);
        }
        let resolved: Vec<SocketAddr> = match lookup_host(seed).await {
            Ok(addrs) => addrs.collect(),
            Err(_) => lookup_host((seed, self.config.default_port))
                .await
                .map_err(|source| MembershipError::Resolve {
                    seed: seed.to_string(),
                    source,
                })?
                .collect(),
        };
        let ipv4 = self.socket.local_addr()?.is_ipv4();
        resolved
            .into_iter()
            .find(|a| a.is_ipv4() == ipv4)
            .ok_or_else(|| MembershipError::NoAddress(seed.to_string()))
    }

    async fn send(&self, to: SocketAddr, packet: &Packet) -> Result<(), MembershipError> {
        let buf = serde_json::to_vec(packet)?;
        if buf.len() > MAX_PACKET {
            warn!(len = buf.len(), %to, "packet too large, dropping");
            return Ok(());
        }
        self.socket.send_to(&buf, to).await?;
        Ok(())
    }

    async fn send_push_pull(
        &self,
        to: SocketAddr,
        join: bool,
        reply: bool,
    ) -> Result<(), MembershipError> {
        let from = lock(&self.local).clone();
        let members = lock(&self.table)
            .alive
            .values()
            .map(|m| m.state.clone())
            .collect();
        let packet = Packet::PushPull {
            from,
            members,
            state: self.delegate.local_state(join),
            join,
            reply,
        };
        self.send(to, &packet).await
    }

    async fn handle(&self, packet: Packet, src: SocketAddr) -> Result<(), MembershipError> {
        match packet {
            Packet::PushPull {
                mut from,
                members,
                state,
                join,
                reply,
            } => {
                // Trust the address the packet came from over the advertised
                // one, which may be unspecified.
                from.addr = src;
                self.merge(from, true);
                for member in members {
                    self.merge(member, false);
                }
                self.delegate.merge_remote_state(&state, join);
                if reply {
                    if let Some(tx) = lock(&self.pending_joins).remove(&src) {
                        let _ = tx.send(());
                    }
                } else {
                    self.send_push_pull(src, join, true).await?;
                }
            }
            Packet::Ping { from, seq } => {
                self.touch(&from, src);
                let ack = Packet::Ack {
                    from: self.config.name.clone(),
                    seq,
                };
                self.send(src, &ack).await?;
            }
            Packet::Ack { from, .. } => self.touch(&from, src),
            Packet::User { from, msg } => {
                self.touch(&from, src);
                self.delegate.notify_msg(&msg);
            }
            Packet::Leave { node } => self.forget(&node.name, Some(node.incarnation)),
        }
        Ok(())
    }

    /// Folds a member's state into the table. `direct` means the member
    /// itself sent it, which also proves it is alive.
    fn merge(&self, state: NodeState, direct: bool) {
        if state.name == self.config.name {
            return;
        }
        let change = {
            let mut table = lock(&self.table);
            let stale = table
                .left
                .get(&state.name)
                .map_or(false, |inc| state.incarnation <= *inc);
            if stale && !direct {
                return;
            }
            table.left.remove(&state.name);

            let now = Instant::now();
            match table.alive.entry(state.name.clone()) {
                Entry::Vacant(slot) => {
                    let node = state.node();
                    slot.insert(Member {
                        state,
                        last_seen: now,
                    });
                    Some(Change::Join(node))
                }
                Entry::Occupied(mut slot) => {
                    let member = slot.get_mut();
                    if direct {
                        member.last_seen = now;
                        member.state.addr = state.addr;
                    }
                    if state.incarnation > member.state.incarnation {
                        member.state.incarnation = state.incarnation;
                        member.state.meta = state.meta;
                        Some(Change::Update(member.state.node()))
                    } else {
                        None
                    }
                }
            }
        };
        self.notify(change);
    }

    fn touch(&self, name: &str, src: SocketAddr) {
        if let Some(member) = lock(&self.table).alive.get_mut(name) {
            member.last_seen = Instant::now();
            member.state.addr = src;
        }
    }

    fn forget(&self, name: &str, incarnation: Option<u64>) {
        let change = {
            let mut table = lock(&self.table);
            let current = table.alive.get(name).map(|m| m.state.incarnation);
            match current {
                // An older leave must not remove a member that has since
                // refreshed itself.
                Some(current) if incarnation.map_or(true, |inc| inc >= current) => {
                    table.alive.remove(name).map(|m| {
                        table.left.insert(name.to_string(), m.state.incarnation);
                        Change::Leave(m.state.node())
                    })
                }
                _ => None,
            }
        };
        self.notify(change);
    }

    fn notify(&self, change: Option<Change>) {
        match change {
            Some(Change::Join(node)) => self.events.notify_join(&node),
            Some(Change::Update(node)) => self.events.notify_update(&node),
            Some(Change::Leave(node)) => self.events.notify_leave(&node),
            None => {}
        }
    }

    fn expire(&self) {
        let dead_after = self.config.dead_after();
        let now = Instant::now();
        let dead: Vec<String> = lock(&self.table)
            .alive
            .values()
            .filter(|m| now.duration_since(m.last_seen) > dead_after)
            .map(|m| m.state.name.clone())
            .collect();
        for name in dead {
            debug!(member = %name, "member timed out");
            self.forget(&name, None);
        }
    }

    fn random_members(&self, n: usize) -> Vec<SocketAddr> {
        let addrs: Vec<SocketAddr> = lock(&self.table)
            .alive
            .values()
            .map(|m| m.state.addr)
            .collect();
        addrs
            .choose_multiple(&mut rand::thread_rng(), n)
            .copied()
            .collect()
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn receive_loop(inner: Arc<Inner>, mut shutdown: Shutdown) {
    let mut buf = vec![0u8; MAX_PACKET];
    loop {
        let (len, src) = tokio::select! {
            _ = shutdown.wait() => break,
            res = inner.socket.recv_from(&mut buf) => match res {
                Ok(received) => received,
                Err(e) => {
                    debug!("receiving packet: {}", e);
                    continue;
                }
            },
        };
        let packet: Packet = match serde_json::from_slice(&buf[..len]) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(%src, "dropping malformed packet: {}", e);
                continue;
            }
        };
        if let Err(e) = inner.handle(packet, src).await {
            warn!(%src, "handling packet: {}", e);
        }
    }
}

async fn probe_loop(inner: Arc<Inner>, mut shutdown: Shutdown) {
    let mut tick = ticker(inner.config.probe_interval);
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = tick.tick() => {}
        }
        inner.expire();
        for addr in inner.random_members(1) {
            let ping = Packet::Ping {
                from: inner.config.name.clone(),
                seq: inner.seq.fetch_add(1, Ordering::Relaxed),
            };
            if let Err(e) = inner.send(addr, &ping).await {
                debug!(%addr, "ping failed: {}", e);
            }
        }
    }
}

async fn gossip_loop(inner: Arc<Inner>, mut shutdown: Shutdown) {
    let mut tick = ticker(inner.config.gossip_interval);
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = tick.tick() => {}
        }
        let targets = inner.random_members(GOSSIP_NODES);
        if targets.is_empty() {
            continue;
        }
        let msgs = inner
            .delegate
            .get_broadcasts(USER_MSG_OVERHEAD, MAX_PACKET - USER_MSG_OVERHEAD);
        for msg in msgs {
            let packet = Packet::User {
                from: inner.config.name.clone(),
                msg,
            };
            for addr in &targets {
                if let Err(e) = inner.send(*addr, &packet).await {
                    debug!(%addr, "gossip failed: {}", e);
                }
            }
        }
    }
}

async fn push_pull_loop(inner: Arc<Inner>, mut shutdown: Shutdown) {
    let mut tick = ticker(inner.config.push_pull_interval);
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = tick.tick() => {}
        }
        for addr in inner.random_members(1) {
            if let Err(e) = inner.send_push_pull(addr, false, false).await {
                debug!(%addr, "push-pull failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        name: String,
        meta: Mutex<String>,
        events: Mutex<Vec<String>>,
        msgs: Mutex<Vec<Vec<u8>>>,
        remote_states: Mutex<Vec<(Vec<u8>, bool)>>,
        outbox: Mutex<Vec<Vec<u8>>>,
    }

    impl Recorder {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Recorder {
                name: name.to_string(),
                meta: Mutex::new(format!("{}Meta", name)),
                ..Default::default()
            })
        }

        fn events(&self) -> Vec<String> {
            lock(&self.events).clone()
        }
    }

    impl Delegate for Recorder {
        fn node_meta(&self, _limit: usize) -> Vec<u8> {
            lock(&self.meta).clone().into_bytes()
        }
        fn notify_msg(&self, msg: &[u8]) {
            lock(&self.msgs).push(msg.to_vec());
        }
        fn get_broadcasts(&self, _overhead: usize, _limit: usize) -> Vec<Vec<u8>> {
            std::mem::take(&mut *lock(&self.outbox))
        }
        fn local_state(&self, _join: bool) -> Vec<u8> {
            self.name.clone().into_bytes()
        }
        fn merge_remote_state(&self, buf: &[u8], join: bool) {
            lock(&self.remote_states).push((buf.to_vec(), join));
        }
    }

    impl EventDelegate for Recorder {
        fn notify_join(&self, node: &Node) {
            lock(&self.events).push(format!("join {}", node.name));
        }
        fn notify_leave(&self, node: &Node) {
            lock(&self.events).push(format!("leave {}", node.name));
        }
        fn notify_update(&self, node: &Node) {
            lock(&self.events).push(format!(
                "update {} {}",
                node.name,
                String::from_utf8_lossy(&node.meta)
            ));
        }
    }

    fn config(name: &str) -> GossipConfig {
        GossipConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            bind_port: 0,
            probe_interval: Duration::from_millis(50),
            push_pull_interval: Duration::from_millis(200),
            gossip_interval: Duration::from_millis(20),
            suspicion_mult: 20,
            join_timeout: Duration::from_millis(500),
            ..GossipConfig::lan(name)
        }
    }

    async fn node(name: &str) -> (Gossip, Arc<Recorder>) {
        let rec = Recorder::new(name);
        let list = Gossip::create(config(name), rec.clone(), rec.clone())
            .await
            .unwrap();
        (list, rec)
    }

    async fn eventually(check: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition never held");
    }

    fn names(list: &Gossip) -> Vec<String> {
        list.members().into_iter().map(|n| n.name).collect()
    }

    #[test]
    fn wan_is_slower_than_lan() {
        let lan = GossipConfig::lan("a");
        let wan = GossipConfig::wan("a");
        assert!(wan.probe_interval > lan.probe_interval);
        assert_eq!(wan.dead_after(), Duration::from_secs(30));
        assert_eq!(wan.bind_port, 7946);
    }

    #[tokio::test]
    async fn join_exchanges_state_both_ways() {
        let (a, rec_a) = node("a").await;
        let (b, rec_b) = node("b").await;

        let joined = b.join(&[a.local_addr().to_string()]).await.unwrap();
        assert_eq!(joined, 1);

        assert_eq!(names(&b), vec!["a"]);
        eventually(|| names(&a) == vec!["b"]).await;
        assert_eq!(rec_a.events(), vec!["join b"]);
        assert_eq!(rec_b.events(), vec!["join a"]);
        assert_eq!(b.members()[0].meta, b"aMeta".to_vec());

        // a saw b's join exchange, b saw a's reply.
        assert!(lock(&rec_a.remote_states).contains(&(b"b".to_vec(), true)));
        assert!(lock(&rec_b.remote_states).contains(&(b"a".to_vec(), true)));
    }

    #[tokio::test]
    async fn members_learn_of_each_other_through_a_seed() {
        let (a, _) = node("a").await;
        let (b, _) = node("b").await;
        let (c, _) = node("c").await;
        let seed = vec![a.local_addr().to_string()];
        b.join(&seed).await.unwrap();
        c.join(&seed).await.unwrap();

        assert_eq!(names(&c), vec!["a", "b"]);
        // b hears about c from a's next push-pull or c's pings.
        eventually(|| names(&b) == vec!["a", "c"]).await;
        eventually(|| names(&a) == vec!["b", "c"]).await;
    }

    #[tokio::test]
    async fn leave_is_announced() {
        let (a, rec_a) = node("a").await;
        let (b, _) = node("b").await;
        b.join(&[a.local_addr().to_string()]).await.unwrap();
        eventually(|| names(&a) == vec!["b"]).await;

        b.leave().await.unwrap();
        eventually(|| a.members().is_empty()).await;
        assert_eq!(rec_a.events(), vec!["join b", "leave b"]);
        assert!(matches!(b.leave().await, Err(MembershipError::Shutdown)));
    }

    #[tokio::test]
    async fn silent_members_expire() {
        let (a, rec_a) = node("a").await;
        let (b, _) = node("b").await;
        b.join(&[a.local_addr().to_string()]).await.unwrap();
        eventually(|| names(&a) == vec!["b"]).await;

        // Dropping stops b's tasks without announcing anything.
        drop(b);
        eventually(|| a.members().is_empty()).await;
        assert_eq!(rec_a.events(), vec!["join b", "leave b"]);
    }

    #[tokio::test]
    async fn meta_updates_and_broadcasts_propagate() {
        let (a, rec_a) = node("a").await;
        let (b, rec_b) = node("b").await;
        b.join(&[a.local_addr().to_string()]).await.unwrap();
        eventually(|| names(&a) == vec!["b"]).await;

        *lock(&rec_b.meta) = "fresh".to_string();
        b.update_node().await.unwrap();
        eventually(|| rec_a.events().contains(&"update b fresh".to_string())).await;
        assert_eq!(b.local_node().meta, b"fresh".to_vec());

        lock(&rec_b.outbox).push(b"hello".to_vec());
        eventually(|| lock(&rec_a.msgs).contains(&b"hello".to_vec())).await;
    }

    #[tokio::test]
    async fn join_without_seeds_is_fine() {
        let (a, _) = node("a").await;
        assert_eq!(a.join(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn join_fails_when_no_seed_answers() {
        let (a, _) = node("a").await;
        // Bound but silent.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let seeds = vec![silent.local_addr().unwrap().to_string()];
        let err = a.join(&seeds).await.unwrap_err();
        assert!(matches!(err, MembershipError::JoinFailed { .. }), "{}", err);
    }

    #[tokio::test]
    async fn resolves_bare_hosts_on_default_port() {
        let (a, _) = node("a").await;
        let addr = a.inner.resolve("127.0.0.1").await.unwrap();
        assert_eq!(addr, "127.0.0.1:7946".parse::<SocketAddr>().unwrap());
        let addr = a.inner.resolve("localhost:1234").await.unwrap();
        assert_eq!(addr, "127.0.0.1:1234".parse::<SocketAddr>().unwrap());
    }
}
