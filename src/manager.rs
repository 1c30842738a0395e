//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Session Manager: the maps, demux, and lifecycle operations that sit
//! between an embedding protocol stack and the per-session tasks.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use ipnetwork::IpNetwork;
use tokio::sync::{mpsc, Notify};
use tracing::warn;

use crate::capabilities::{MetricsReporter, PacketSender, SessionTypeName};
use crate::debug::Debug;
use crate::discriminator::DiscriminatorAllocator;
use crate::echo::{EchoConfig, EchoSession};
use crate::error::Error;
use crate::event::{PacketMeta, StateChange};
use crate::microbfd::MicroBfdGroup;
use crate::packet::{ControlPacket, DiagnosticCode, PacketFlags, State};
use crate::session::{Session, SessionConfig, SessionKey, SessionRole, SessionType, Snapshot};

/// Depth of the bounded channel sessions emit state changes into, and of
/// the public channel the dispatcher forwards them onto.
const NOTIFY_CHANNEL_DEPTH: usize = 64;

/// Cooperative cancellation signal shared by a session task and its owner.
///
/// Hand-rolled rather than pulling in `tokio-util`'s `CancellationToken`:
/// the core's dependency stack has no other use for that crate.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolves immediately if already cancelled, otherwise waits for the
    /// next [`cancel`](Self::cancel) call.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelToken {
    fn default() -> CancelToken {
        CancelToken::new()
    }
}

/// Policy enforced on the auto-creation path for RFC 9468 unsolicited BFD.
#[derive(Clone, Debug, Default)]
pub struct UnsolicitedPolicy {
    pub enabled: bool,
    pub enabled_interfaces: Vec<String>,
    pub allowed_prefixes: Vec<IpNetwork>,
    pub max_sessions: usize,
    pub defaults: UnsolicitedDefaults,
}

/// Session parameters applied to a passive session auto-created on first
/// unsolicited packet.
#[derive(Clone, Debug)]
pub struct UnsolicitedDefaults {
    pub desired_min_tx_interval: u32,
    pub required_min_rx_interval: u32,
    pub detect_multiplier: u8,
    pub padded_pdu_size: u16,
}

impl Default for UnsolicitedDefaults {
    fn default() -> UnsolicitedDefaults {
        UnsolicitedDefaults {
            desired_min_tx_interval: 1_000_000,
            required_min_rx_interval: 1_000_000,
            detect_multiplier: 3,
            padded_pdu_size: 0,
        }
    }
}

impl UnsolicitedPolicy {
    fn interface_enabled(&self, if_name: &str) -> bool {
        self.enabled_interfaces.iter().any(|i| i == if_name)
    }

    fn prefix_allowed(&self, addr: IpAddr) -> bool {
        self.allowed_prefixes.iter().any(|net| net.contains(addr))
    }
}

struct SessionEntry {
    session: Arc<Session>,
    cancel: CancelToken,
}

struct EchoEntry {
    session: Arc<EchoSession>,
    cancel: CancelToken,
}

#[derive(Default)]
struct Maps {
    by_discriminator: HashMap<u32, SessionEntry>,
    by_key: HashMap<SessionKey, u32>,
    echo_by_discriminator: HashMap<u32, EchoEntry>,
    echo_by_key: HashMap<SessionKey, u32>,
    microbfd_groups: HashMap<String, MicroBfdGroup>,
    /// Member link interface name -> owning LAG interface name, so a member
    /// session's `StateChange` (which carries the member's own interface,
    /// not the LAG's) can be routed to its group.
    member_to_lag: HashMap<String, String>,
}

/// Owns every session, echo session, and micro-BFD group, and is the only
/// entry point an embedder demuxes packets through.
pub struct Manager {
    maps: RwLock<Maps>,
    discriminators: DiscriminatorAllocator,
    sender: Arc<dyn PacketSender>,
    metrics: Arc<dyn MetricsReporter>,
    raw_notify_tx: mpsc::Sender<StateChange>,
    public_notify_rx: tokio::sync::Mutex<Option<mpsc::Receiver<StateChange>>>,
    unsolicited: RwLock<UnsolicitedPolicy>,
}

impl Manager {
    pub fn new(sender: Arc<dyn PacketSender>, metrics: Arc<dyn MetricsReporter>) -> Arc<Manager> {
        let (raw_notify_tx, raw_notify_rx) = mpsc::channel(NOTIFY_CHANNEL_DEPTH);
        let (public_notify_tx, public_notify_rx) = mpsc::channel(NOTIFY_CHANNEL_DEPTH);

        let manager = Arc::new(Manager {
            maps: RwLock::new(Maps::default()),
            discriminators: DiscriminatorAllocator::new(),
            sender,
            metrics,
            raw_notify_tx,
            public_notify_rx: tokio::sync::Mutex::new(Some(public_notify_rx)),
            unsolicited: RwLock::new(UnsolicitedPolicy::default()),
        });

        tokio::spawn(dispatch(manager.clone(), raw_notify_rx, public_notify_tx));
        manager
    }

    pub fn set_unsolicited_policy(&self, policy: UnsolicitedPolicy) {
        *self.unsolicited.write().unwrap() = policy;
    }

    /// Takes ownership of the public notification stream. Callable once;
    /// subsequent calls return `None`.
    pub async fn state_changes(&self) -> Option<mpsc::Receiver<StateChange>> {
        self.public_notify_rx.lock().await.take()
    }

    // ----- control sessions -----

    pub fn create_session(&self, config: SessionConfig) -> Result<u32, Error> {
        let key = config.key();
        {
            let maps = self.maps.read().unwrap();
            if maps.by_key.contains_key(&key) {
                return Err(Error::DuplicateSession(SocketAddr::new(key.peer_addr, 0)));
            }
        }

        let discr = self.discriminators.allocate()?;
        let (session, inbound_rx) = match Session::new(
            config,
            discr,
            self.sender.clone(),
            self.raw_notify_tx.clone(),
            self.metrics.clone(),
        ) {
            Ok(pair) => pair,
            Err(e) => {
                self.discriminators.release(discr);
                return Err(e.into());
            }
        };

        {
            let mut maps = self.maps.write().unwrap();
            if maps.by_key.contains_key(&key) {
                self.discriminators.release(discr);
                return Err(Error::DuplicateSession(SocketAddr::new(key.peer_addr, 0)));
            }
            let cancel = CancelToken::new();
            tokio::spawn(crate::session::run(session.clone(), cancel.clone(), inbound_rx));
            self.metrics.session_registered(
                session.peer_socket_addr(),
                SocketAddr::new(key.local_addr, 0),
                session.config.session_type.type_name(),
            );
            maps.by_key.insert(key, discr);
            maps.by_discriminator.insert(discr, SessionEntry { session, cancel });
        }

        Ok(discr)
    }

    pub fn destroy_session(&self, discriminator: u32) -> Result<(), Error> {
        let mut maps = self.maps.write().unwrap();
        let Some(entry) = maps.by_discriminator.remove(&discriminator) else {
            return Err(Error::SessionNotFound(discriminator));
        };
        maps.by_key.remove(&entry.session.key());
        entry.cancel.cancel();
        self.discriminators.release(discriminator);
        self.metrics.session_unregistered(
            entry.session.peer_socket_addr(),
            SocketAddr::new(entry.session.config.local_addr, 0),
            entry.session.config.session_type.type_name(),
        );
        Debug::SessionDelete(discriminator, &entry.session.key()).log();
        Ok(())
    }

    pub fn lookup_by_discriminator(&self, discriminator: u32) -> Option<Arc<Session>> {
        self.maps
            .read()
            .unwrap()
            .by_discriminator
            .get(&discriminator)
            .map(|e| e.session.clone())
    }

    pub fn lookup_by_peer(&self, key: &SessionKey) -> Option<Arc<Session>> {
        let maps = self.maps.read().unwrap();
        maps.by_key
            .get(key)
            .and_then(|discr| maps.by_discriminator.get(discr))
            .map(|e| e.session.clone())
    }

    pub fn sessions(&self) -> Vec<Snapshot> {
        self.maps
            .read()
            .unwrap()
            .by_discriminator
            .values()
            .map(|e| e.session.snapshot())
            .collect()
    }

    /// Two-tier demux without the raw wire bytes (no authentication on this
    /// path; use [`demux_with_wire`](Self::demux_with_wire) when the packet
    /// may be authenticated).
    pub fn demux(&self, packet: ControlPacket, meta: &PacketMeta) -> Result<(), Error> {
        self.demux_with_wire(packet, meta, None)
    }

    pub fn demux_with_wire(
        &self,
        packet: ControlPacket,
        meta: &PacketMeta,
        wire: Option<Bytes>,
    ) -> Result<(), Error> {
        if packet.your_discriminator != 0 {
            let session = self
                .lookup_by_discriminator(packet.your_discriminator)
                .ok_or(Error::DemuxNoMatch(SocketAddr::new(meta.src_addr, 0)))?;
            session.recv_packet(packet, wire);
            return Ok(());
        }

        let key = SessionKey {
            peer_addr: meta.src_addr,
            local_addr: meta.dst_addr,
            interface: meta.if_name.clone(),
        };
        if let Some(session) = self.lookup_by_peer(&key) {
            session.recv_packet(packet, wire);
            return Ok(());
        }

        self.try_unsolicited_create(key, packet, wire, meta)
    }

    fn try_unsolicited_create(
        &self,
        key: SessionKey,
        packet: ControlPacket,
        wire: Option<Bytes>,
        meta: &PacketMeta,
    ) -> Result<(), Error> {
        // RFC 9468 §6.1: unsolicited BFD is single-hop only; multi-hop
        // packets arrive without an interface binding.
        if key.interface.is_empty() {
            return Err(Error::DemuxNoMatch(SocketAddr::new(meta.src_addr, 0)));
        }

        let policy = self.unsolicited.read().unwrap().clone();
        if !policy.enabled {
            return Err(Error::DemuxNoMatch(SocketAddr::new(meta.src_addr, 0)));
        }
        if !policy.interface_enabled(&key.interface) {
            return Err(Error::UnsolicitedInterfaceNotEnabled(key.interface));
        }
        if !policy.prefix_allowed(meta.src_addr) {
            return Err(Error::UnsolicitedPrefixDenied(meta.src_addr));
        }
        if self.maps.read().unwrap().by_discriminator.len() >= policy.max_sessions {
            return Err(Error::UnsolicitedMaxSessions);
        }

        let config = SessionConfig {
            peer_addr: key.peer_addr,
            local_addr: key.local_addr,
            interface: key.interface.clone(),
            session_type: SessionType::SingleHop,
            role: SessionRole::Passive,
            desired_min_tx_interval: policy.defaults.desired_min_tx_interval,
            required_min_rx_interval: policy.defaults.required_min_rx_interval,
            detect_multiplier: policy.defaults.detect_multiplier,
            padded_pdu_size: policy.defaults.padded_pdu_size,
            auth: None,
        };

        let discr = self.create_session(config)?;
        Debug::UnsolicitedSessionCreate(discr, &key).log();
        if let Some(session) = self.lookup_by_discriminator(discr) {
            session.recv_packet(packet, wire);
        }
        Ok(())
    }

    // ----- echo sessions -----

    pub fn create_echo_session(&self, config: EchoConfig) -> Result<u32, Error> {
        let key = SessionKey {
            peer_addr: config.peer_addr,
            local_addr: config.local_addr,
            interface: config.interface.clone(),
        };
        let mut maps = self.maps.write().unwrap();
        if maps.echo_by_key.contains_key(&key) {
            return Err(Error::DuplicateSession(SocketAddr::new(key.peer_addr, 0)));
        }
        let discr = self.discriminators.allocate()?;
        let session = EchoSession::new(
            config,
            discr,
            self.sender.clone(),
            self.raw_notify_tx.clone(),
            self.metrics.clone(),
        );
        let cancel = CancelToken::new();
        tokio::spawn(crate::echo::run(session.clone(), cancel.clone()));
        maps.echo_by_key.insert(key, discr);
        maps.echo_by_discriminator
            .insert(discr, EchoEntry { session, cancel });
        Ok(discr)
    }

    pub fn destroy_echo_session(&self, discriminator: u32) -> Result<(), Error> {
        let mut maps = self.maps.write().unwrap();
        let Some(entry) = maps.echo_by_discriminator.remove(&discriminator) else {
            return Err(Error::EchoSessionNotFound(discriminator));
        };
        let key = SessionKey {
            peer_addr: entry.session.config.peer_addr,
            local_addr: entry.session.config.local_addr,
            interface: entry.session.config.interface.clone(),
        };
        maps.echo_by_key.remove(&key);
        entry.cancel.cancel();
        self.discriminators.release(discriminator);
        Ok(())
    }

    pub fn demux_echo(&self, meta: &PacketMeta) -> Result<(), Error> {
        let key = SessionKey {
            peer_addr: meta.src_addr,
            local_addr: meta.dst_addr,
            interface: meta.if_name.clone(),
        };
        let maps = self.maps.read().unwrap();
        let discr = maps
            .echo_by_key
            .get(&key)
            .ok_or(Error::EchoDemuxNoMatch(SocketAddr::new(meta.src_addr, 0)))?;
        let entry = maps.echo_by_discriminator.get(discr).unwrap();
        entry.session.recv_echo();
        Ok(())
    }

    // ----- micro-BFD groups -----

    pub fn create_microbfd_group(&self, group: MicroBfdGroup) -> Result<(), Error> {
        let mut maps = self.maps.write().unwrap();
        if maps.microbfd_groups.contains_key(&group.lag_interface) {
            return Err(Error::MicroBfdGroupExists(group.lag_interface));
        }
        for member in group.member_names() {
            maps.member_to_lag
                .insert(member.clone(), group.lag_interface.clone());
        }
        maps.microbfd_groups.insert(group.lag_interface.clone(), group);
        Ok(())
    }

    pub fn destroy_microbfd_group(&self, lag_interface: &str) -> Result<(), Error> {
        let mut maps = self.maps.write().unwrap();
        let Some(group) = maps.microbfd_groups.remove(lag_interface) else {
            return Err(Error::MicroBfdGroupNotFound(lag_interface.to_string()));
        };
        for member in group.member_names() {
            maps.member_to_lag.remove(member);
        }
        Ok(())
    }

    /// Current up-member count for a micro-BFD group, for callers that want
    /// to observe aggregate liveness without owning the group themselves.
    pub fn microbfd_up_count(&self, lag_interface: &str) -> Option<usize> {
        self.maps
            .read()
            .unwrap()
            .microbfd_groups
            .get(lag_interface)
            .map(|g| g.up_count())
    }

    fn route_microbfd(&self, change: &StateChange) {
        if change.session_type != SessionTypeName::MicroBfd || change.interface.is_empty() {
            return;
        }
        let mut maps = self.maps.write().unwrap();
        let Some(lag_interface) = maps.member_to_lag.get(&change.interface).cloned() else {
            return;
        };
        if let Some(group) = maps.microbfd_groups.get_mut(&lag_interface) {
            group.update_member_state(&change.interface, change.new_state, change.local_discr);
        }
    }

    // ----- lifecycle -----

    /// RFC 5880 §6.8.16 graceful drain: admin-downs every session and gives
    /// peers one TX interval to observe it before the caller exits.
    pub async fn drain_all(&self) {
        let sessions: Vec<_> = {
            let maps = self.maps.read().unwrap();
            maps.by_discriminator.values().map(|e| e.session.clone()).collect()
        };
        for session in &sessions {
            session.set_admin_down();
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    pub fn close(&self) {
        let mut maps = self.maps.write().unwrap();
        for entry in maps.by_discriminator.values() {
            entry.cancel.cancel();
        }
        for entry in maps.echo_by_discriminator.values() {
            entry.cancel.cancel();
        }
        maps.by_discriminator.clear();
        maps.by_key.clear();
        maps.echo_by_discriminator.clear();
        maps.echo_by_key.clear();
    }

    /// Diffs the desired set of sessions (keyed by the caller's own string
    /// key) against what's running: creates missing, destroys extra, leaves
    /// unchanged entries alone. Errors accumulate; the walk continues
    /// across partial failures.
    pub fn reconcile_sessions(
        &self,
        desired: Vec<(String, SessionConfig)>,
    ) -> Vec<(String, Error)> {
        let mut errors = Vec::new();
        let desired_keys: HashMap<String, SessionKey> = desired
            .iter()
            .map(|(name, cfg)| (name.clone(), cfg.key()))
            .collect();

        let existing_keys: Vec<SessionKey> = {
            let maps = self.maps.read().unwrap();
            maps.by_key.keys().cloned().collect()
        };
        for key in existing_keys {
            if !desired_keys.values().any(|k| *k == key) {
                if let Some(discr) = self.maps.read().unwrap().by_key.get(&key).copied() {
                    if let Err(e) = self.destroy_session(discr) {
                        errors.push((format!("{key:?}"), e));
                    }
                }
            }
        }

        for (name, config) in desired {
            let key = config.key();
            let already_running = self.maps.read().unwrap().by_key.contains_key(&key);
            if already_running {
                continue;
            }
            if let Err(e) = self.create_session(config) {
                errors.push((name, e));
            }
        }

        errors
    }
}

async fn dispatch(
    manager: Arc<Manager>,
    mut raw_rx: mpsc::Receiver<StateChange>,
    public_tx: mpsc::Sender<StateChange>,
) {
    while let Some(change) = raw_rx.recv().await {
        manager.route_microbfd(&change);
        if public_tx.try_send(change).is_err() {
            warn!("public state-change notification dropped, consumer too slow");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::NoopMetricsReporter;

    struct NullSender;
    impl PacketSender for NullSender {
        fn send(
            &self,
            _buffer: &[u8],
            _destination: SocketAddr,
        ) -> Result<(), crate::capabilities::SendError> {
            Ok(())
        }
    }

    fn manager() -> Arc<Manager> {
        Manager::new(Arc::new(NullSender), Arc::new(NoopMetricsReporter))
    }

    fn base_packet() -> ControlPacket {
        ControlPacket {
            version: ControlPacket::VERSION,
            diag: DiagnosticCode::None,
            state: State::Down,
            flags: PacketFlags::empty(),
            detect_mult: 3,
            my_discriminator: 200,
            your_discriminator: 0,
            desired_min_tx_interval: 100_000,
            required_min_rx_interval: 100_000,
            required_min_echo_rx_interval: 0,
            auth: None,
        }
    }

    fn config(peer: &str, local: &str, interface: &str) -> SessionConfig {
        SessionConfig {
            peer_addr: peer.parse().unwrap(),
            local_addr: local.parse().unwrap(),
            interface: interface.to_string(),
            session_type: SessionType::SingleHop,
            role: SessionRole::Active,
            desired_min_tx_interval: 100_000,
            required_min_rx_interval: 100_000,
            detect_multiplier: 3,
            padded_pdu_size: 0,
            auth: None,
        }
    }

    #[tokio::test]
    async fn create_then_lookup_then_destroy() {
        let mgr = manager();
        let discr = mgr.create_session(config("10.0.0.2", "10.0.0.1", "eth0")).unwrap();
        assert!(mgr.lookup_by_discriminator(discr).is_some());
        mgr.destroy_session(discr).unwrap();
        assert!(mgr.lookup_by_discriminator(discr).is_none());
    }

    #[tokio::test]
    async fn duplicate_session_rejected() {
        let mgr = manager();
        mgr.create_session(config("10.0.0.2", "10.0.0.1", "eth0")).unwrap();
        let err = mgr
            .create_session(config("10.0.0.2", "10.0.0.1", "eth0"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSession(..)));
    }

    #[tokio::test]
    async fn destroy_unknown_session_not_found() {
        let mgr = manager();
        let err = mgr.destroy_session(42).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(42)));
    }

    #[tokio::test]
    async fn demux_tier1_hit_by_discriminator() {
        let mgr = manager();
        let discr = mgr.create_session(config("10.0.0.2", "10.0.0.1", "eth0")).unwrap();

        let mut packet = base_packet();
        packet.your_discriminator = discr;
        let meta = PacketMeta {
            src_addr: "10.0.0.2".parse().unwrap(),
            dst_addr: "10.0.0.1".parse().unwrap(),
            ttl: 255,
            if_name: "eth0".to_string(),
        };
        assert!(mgr.demux(packet, &meta).is_ok());
    }

    #[tokio::test]
    async fn demux_miss_without_unsolicited_policy() {
        let mgr = manager();
        let packet = base_packet();
        let meta = PacketMeta {
            src_addr: "10.0.0.7".parse().unwrap(),
            dst_addr: "10.0.0.2".parse().unwrap(),
            ttl: 255,
            if_name: "eth0".to_string(),
        };
        let err = mgr.demux(packet, &meta).unwrap_err();
        assert!(matches!(err, Error::DemuxNoMatch(..)));
    }

    #[tokio::test]
    async fn unsolicited_auto_create_within_policy() {
        let mgr = manager();
        mgr.set_unsolicited_policy(UnsolicitedPolicy {
            enabled: true,
            enabled_interfaces: vec!["eth0".to_string()],
            allowed_prefixes: vec!["10.0.0.0/24".parse().unwrap()],
            max_sessions: 10,
            defaults: UnsolicitedDefaults::default(),
        });

        let packet = base_packet();
        let meta = PacketMeta {
            src_addr: "10.0.0.7".parse().unwrap(),
            dst_addr: "10.0.0.2".parse().unwrap(),
            ttl: 255,
            if_name: "eth0".to_string(),
        };
        assert!(mgr.demux(packet, &meta).is_ok());
        assert_eq!(mgr.sessions().len(), 1);
    }

    #[tokio::test]
    async fn unsolicited_prefix_denied() {
        let mgr = manager();
        mgr.set_unsolicited_policy(UnsolicitedPolicy {
            enabled: true,
            enabled_interfaces: vec!["eth0".to_string()],
            allowed_prefixes: vec!["10.0.0.0/24".parse().unwrap()],
            max_sessions: 10,
            defaults: UnsolicitedDefaults::default(),
        });

        let packet = base_packet();
        let meta = PacketMeta {
            src_addr: "192.168.1.5".parse().unwrap(),
            dst_addr: "10.0.0.2".parse().unwrap(),
            ttl: 255,
            if_name: "eth0".to_string(),
        };
        let err = mgr.demux(packet, &meta).unwrap_err();
        assert!(matches!(err, Error::UnsolicitedPrefixDenied(..)));
    }

    #[tokio::test]
    async fn microbfd_member_transition_routes_through_manager() {
        let mgr = manager();
        let group = MicroBfdGroup::new(
            "bond0".to_string(),
            "10.0.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            &["eth0".to_string(), "eth1".to_string()],
            1,
        )
        .unwrap();
        mgr.create_microbfd_group(group).unwrap();

        let mut member_config = config("10.0.0.2", "10.0.0.1", "eth0");
        member_config.session_type = SessionType::MicroBfd;
        let discr = mgr.create_session(member_config).unwrap();

        let mut packet = base_packet();
        packet.state = State::Up;
        packet.your_discriminator = discr;
        let meta = PacketMeta {
            src_addr: "10.0.0.2".parse().unwrap(),
            dst_addr: "10.0.0.1".parse().unwrap(),
            ttl: 255,
            if_name: "eth0".to_string(),
        };
        mgr.demux(packet, &meta).unwrap();

        // Give the dispatcher a chance to drain the notification and route it.
        for _ in 0..50 {
            tokio::task::yield_now().await;
            if mgr.microbfd_up_count("bond0") == Some(1) {
                return;
            }
        }
        panic!("micro-BFD member state change never routed to its group");
    }
}
