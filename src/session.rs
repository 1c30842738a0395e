//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Per-session runtime: one cooperative task driving the FSM, the TX/detect
//! timers, and the inbound packet queue for a single BFD session.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug_span, warn};

use crate::auth::{self, AuthState};
use crate::capabilities::{
    AuthKeyStore, MetricsReporter, PacketSender, SessionTypeName,
};
use crate::debug::Debug;
use crate::event::StateChange;
use crate::fsm;
use crate::manager::CancelToken;
use crate::packet::{ControlPacket, DiagnosticCode, PacketFlags, State};

/// 1 second, in microseconds: the TX floor whenever a session is not Up.
const SLOW_TX_INTERVAL_US: u32 = 1_000_000;

/// Depth of a session's inbound queue (RFC 5880 favors dropping a packet
/// over stalling the FSM).
const INBOUND_QUEUE_DEPTH: usize = 16;

/// Identity a session is demultiplexed by on the second tier (no
/// `your_discriminator` yet known).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SessionKey {
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    pub interface: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionType {
    SingleHop,
    MultiHop,
    MicroBfd,
}

impl SessionType {
    pub fn type_name(self) -> SessionTypeName {
        match self {
            SessionType::SingleHop => SessionTypeName::SingleHop,
            SessionType::MultiHop => SessionTypeName::MultiHop,
            SessionType::MicroBfd => SessionTypeName::MicroBfd,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionRole {
    Active,
    Passive,
}

/// Authentication wiring for a session: the type it requires and the key
/// material used to sign/verify.
#[derive(Clone)]
pub struct SessionAuthConfig {
    pub auth_type: crate::packet::AuthType,
    pub key_store: Arc<dyn AuthKeyStore>,
}

/// Immutable session configuration, validated at construction time.
#[derive(Clone)]
pub struct SessionConfig {
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    /// Empty for multi-hop sessions.
    pub interface: String,
    pub session_type: SessionType,
    pub role: SessionRole,
    /// Microseconds.
    pub desired_min_tx_interval: u32,
    /// Microseconds.
    pub required_min_rx_interval: u32,
    pub detect_multiplier: u8,
    /// 0 disables RFC 9764 padding; otherwise in `[24, 9000]`.
    pub padded_pdu_size: u16,
    pub auth: Option<SessionAuthConfig>,
}

impl SessionConfig {
    pub fn key(&self) -> SessionKey {
        SessionKey {
            peer_addr: self.peer_addr,
            local_addr: self.local_addr,
            interface: self.interface.clone(),
        }
    }
}

/// Session construction failures: an invalid field plus a human reason.
#[derive(Debug, Eq, PartialEq)]
pub struct InvalidConfig {
    pub field: &'static str,
    pub reason: &'static str,
}

impl std::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid config field `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for InvalidConfig {}

fn validate_config(config: &SessionConfig) -> Result<(), InvalidConfig> {
    if config.detect_multiplier == 0 {
        return Err(InvalidConfig {
            field: "detect_multiplier",
            reason: "must be nonzero",
        });
    }
    if config.desired_min_tx_interval == 0 {
        return Err(InvalidConfig {
            field: "desired_min_tx_interval",
            reason: "must be nonzero",
        });
    }
    if config.padded_pdu_size != 0
        && !(24..=9000).contains(&config.padded_pdu_size)
    {
        return Err(InvalidConfig {
            field: "padded_pdu_size",
            reason: "must be 0 or in [24, 9000]",
        });
    }
    match config.session_type {
        SessionType::SingleHop | SessionType::MicroBfd => {
            if config.interface.is_empty() {
                return Err(InvalidConfig {
                    field: "interface",
                    reason: "single-hop and micro-BFD sessions require an interface",
                });
            }
        }
        SessionType::MultiHop => {
            if !config.interface.is_empty() {
                return Err(InvalidConfig {
                    field: "interface",
                    reason: "multi-hop sessions must not bind an interface",
                });
            }
        }
    }
    if config.peer_addr.is_unspecified() {
        return Err(InvalidConfig {
            field: "peer_addr",
            reason: "must not be unspecified",
        });
    }
    Ok(())
}

/// Messages delivered to a session's inbound queue.
pub enum Inbound {
    Packet {
        packet: ControlPacket,
        wire: Option<Bytes>,
    },
    AdminDownSet,
}

/// Point-in-time copy of a session's externally visible fields.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub local_discriminator: u32,
    pub state: State,
    pub remote_state: State,
    pub local_diag: DiagnosticCode,
    pub remote_discriminator: u32,
    pub remote_required_min_rx_interval: u32,
    pub remote_desired_min_tx_interval: u32,
    pub remote_detect_mult: u8,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub state_transitions: u64,
    pub last_state_change: Option<SystemTime>,
    pub last_packet_received: Option<SystemTime>,
}

/// A single BFD session: shared atomics readable without locking, plus the
/// channels its task is driven by.
pub struct Session {
    pub local_discriminator: u32,
    pub config: SessionConfig,
    sender: Arc<dyn PacketSender>,
    metrics: Arc<dyn MetricsReporter>,
    notify_tx: mpsc::Sender<StateChange>,
    inbound_tx: mpsc::Sender<Inbound>,

    state: AtomicU8,
    remote_state: AtomicU8,
    local_diag: AtomicU8,
    remote_discriminator: AtomicU32,
    remote_required_min_rx_interval: AtomicU32,
    remote_desired_min_tx_interval: AtomicU32,
    remote_detect_mult: AtomicU8,
    packets_sent: AtomicU64,
    packets_received: AtomicU64,
    state_transitions: AtomicU64,
    last_state_change: AtomicU64,
    last_packet_received: AtomicU64,
}

impl Session {
    /// Validates `config` and constructs a new session in state `Down`.
    /// Returns the session handle and the receiving half of its inbound
    /// queue, which the caller hands to [`run`].
    pub fn new(
        config: SessionConfig,
        discriminator: u32,
        sender: Arc<dyn PacketSender>,
        notify_tx: mpsc::Sender<StateChange>,
        metrics: Arc<dyn MetricsReporter>,
    ) -> Result<(Arc<Session>, mpsc::Receiver<Inbound>), InvalidConfig> {
        validate_config(&config)?;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_DEPTH);
        let session = Arc::new(Session {
            local_discriminator: discriminator,
            config,
            sender,
            metrics,
            notify_tx,
            inbound_tx,
            state: AtomicU8::new(State::Down as u8),
            remote_state: AtomicU8::new(State::Down as u8),
            local_diag: AtomicU8::new(DiagnosticCode::None as u8),
            remote_discriminator: AtomicU32::new(0),
            remote_required_min_rx_interval: AtomicU32::new(0),
            remote_desired_min_tx_interval: AtomicU32::new(0),
            remote_detect_mult: AtomicU8::new(0),
            packets_sent: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            state_transitions: AtomicU64::new(0),
            last_state_change: AtomicU64::new(0),
            last_packet_received: AtomicU64::new(0),
        });

        Debug::SessionCreate(session.local_discriminator, &session.config.key()).log();
        Ok((session, inbound_rx))
    }

    pub fn key(&self) -> SessionKey {
        self.config.key()
    }

    pub fn peer_socket_addr(&self) -> SocketAddr {
        // Port 3784 for single/multi-hop, 6784 for micro-BFD (RFC 7130);
        // the embedder's transport owns binding, this is informational.
        let port = match self.config.session_type {
            SessionType::MicroBfd => 6784,
            SessionType::SingleHop | SessionType::MultiHop => 3784,
        };
        SocketAddr::new(self.config.peer_addr, port)
    }

    // ----- atomic reads -----

    pub fn state(&self) -> State {
        state_from_u8_or_down(self.state.load(Ordering::Acquire))
    }

    pub fn remote_state(&self) -> State {
        state_from_u8_or_down(self.remote_state.load(Ordering::Acquire))
    }

    pub fn local_diag(&self) -> DiagnosticCode {
        num_traits::FromPrimitive::from_u8(self.local_diag.load(Ordering::Acquire))
            .unwrap_or_default()
    }

    pub fn remote_discriminator(&self) -> u32 {
        self.remote_discriminator.load(Ordering::Acquire)
    }

    pub fn remote_detect_mult(&self) -> u8 {
        self.remote_detect_mult.load(Ordering::Acquire)
    }

    pub fn remote_required_min_rx_interval(&self) -> u32 {
        self.remote_required_min_rx_interval.load(Ordering::Acquire)
    }

    pub fn remote_desired_min_tx_interval(&self) -> u32 {
        self.remote_desired_min_tx_interval.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            local_discriminator: self.local_discriminator,
            state: self.state(),
            remote_state: self.remote_state(),
            local_diag: self.local_diag(),
            remote_discriminator: self.remote_discriminator(),
            remote_required_min_rx_interval: self
                .remote_required_min_rx_interval(),
            remote_desired_min_tx_interval: self
                .remote_desired_min_tx_interval(),
            remote_detect_mult: self.remote_detect_mult(),
            packets_sent: self.packets_sent.load(Ordering::Acquire),
            packets_received: self.packets_received.load(Ordering::Acquire),
            state_transitions: self.state_transitions.load(Ordering::Acquire),
            last_state_change: millis_to_time(
                self.last_state_change.load(Ordering::Acquire),
            ),
            last_packet_received: millis_to_time(
                self.last_packet_received.load(Ordering::Acquire),
            ),
        }
    }

    // ----- public, non-blocking entry points -----

    /// Delivers an already-decoded packet (and, if authentication may be
    /// needed, the raw wire bytes) to the session. Drops silently (counted
    /// via metrics) when the inbound queue is full.
    pub fn recv_packet(&self, packet: ControlPacket, wire: Option<Bytes>) {
        if self
            .inbound_tx
            .try_send(Inbound::Packet { packet, wire })
            .is_err()
        {
            warn!(discr = self.local_discriminator, "inbound queue full, dropping packet");
        }
    }

    /// Injects an `AdminDownSet` event. Idempotent.
    pub fn set_admin_down(&self) {
        let _ = self.inbound_tx.try_send(Inbound::AdminDownSet);
    }

    // ----- TX/RX algorithms -----

    fn desired_tx_interval(&self) -> u32 {
        if self.state() != State::Up {
            return SLOW_TX_INTERVAL_US.max(self.config.desired_min_tx_interval);
        }
        self.config.desired_min_tx_interval
    }

    /// Effective (pre-jitter) TX interval, RFC 5880 §6.8.7.
    fn negotiated_tx_interval(&self) -> u32 {
        if self.state() == State::Up {
            self.config
                .desired_min_tx_interval
                .max(self.remote_required_min_rx_interval())
        } else {
            self.desired_tx_interval()
        }
    }

    /// RX-side negotiated interval used for the detection time formula.
    fn negotiated_rx_interval(&self) -> u32 {
        self.config
            .required_min_rx_interval
            .max(self.remote_desired_min_tx_interval())
    }

    fn detection_time_us(&self) -> u32 {
        self.remote_detect_mult() as u32 * self.negotiated_rx_interval()
    }

    /// Whether we have heard anything at all from the peer.
    fn peer_known(&self) -> bool {
        self.remote_detect_mult() != 0
    }

    /// Uniform jitter in [75%, 100%) of `interval_us`, narrowed to
    /// [75%, 90%) when the detect multiplier is 1 (RFC 5880 §6.8.7).
    fn jittered(&self, interval_us: u32) -> Duration {
        let mut rng = rand::rng();
        let (lo, hi) = if self.config.detect_multiplier == 1 {
            (0.75, 0.90)
        } else {
            (0.75, 1.00)
        };
        let factor: f64 = rng.random_range(lo..hi);
        Duration::from_micros((interval_us as f64 * factor) as u64)
    }

    /// Passive sessions that have never heard from their peer must not
    /// transmit (RFC 5880 §6.8.1).
    fn tx_suppressed(&self) -> bool {
        self.config.role == SessionRole::Passive && self.remote_discriminator() == 0
    }

    fn set_state(&self, new_state: State, diag: DiagnosticCode) {
        let old_raw = self.state.swap(new_state as u8, Ordering::AcqRel);
        let old_state = state_from_u8_or_down(old_raw);
        self.local_diag.store(diag as u8, Ordering::Release);
        self.state_transitions.fetch_add(1, Ordering::AcqRel);
        self.last_state_change.store(now_millis(), Ordering::Release);

        Debug::FsmTransition(self.local_discriminator, old_state, new_state).log();
        self.metrics.state_transition(
            self.peer_socket_addr(),
            SocketAddr::new(self.config.local_addr, 0),
            state_name(old_state),
            state_name(new_state),
        );

        let change = StateChange {
            local_discr: self.local_discriminator,
            peer: self.peer_socket_addr(),
            old_state,
            new_state,
            diag,
            interface: self.config.interface.clone(),
            session_type: self.config.session_type.type_name(),
            timestamp: SystemTime::now(),
        };
        if self.notify_tx.try_send(change).is_err() {
            warn!(discr = self.local_discriminator, "state-change notification dropped");
        }
    }

    fn apply_event(&self, event: fsm::Event) {
        let (new_state, diag) = fsm::transition(self.state(), event);
        if new_state != self.state() || event == fsm::Event::AdminDownSet {
            self.set_state(new_state, diag);
        }
    }

    fn build_packet(&self, poll: bool, final_: bool) -> ControlPacket {
        let mut flags = PacketFlags::empty();
        if poll {
            flags.insert(PacketFlags::POLL);
        }
        if final_ {
            flags.insert(PacketFlags::FINAL);
        }
        ControlPacket {
            version: ControlPacket::VERSION,
            diag: self.local_diag(),
            state: self.state(),
            flags,
            detect_mult: self.config.detect_multiplier,
            my_discriminator: self.local_discriminator,
            your_discriminator: self.remote_discriminator(),
            desired_min_tx_interval: self.desired_tx_interval(),
            required_min_rx_interval: self.config.required_min_rx_interval,
            required_min_echo_rx_interval: 0,
            auth: None,
        }
    }

    fn transmit(
        &self,
        poll: bool,
        final_: bool,
        auth_state: &mut Option<AuthState>,
    ) {
        if !final_ && self.tx_suppressed() {
            return;
        }

        let mut packet = self.build_packet(poll, final_);
        let mut buf = vec![0u8; crate::packet::MAX_PADDED_PDU_SIZE as usize];
        let result = match (&self.config.auth, auth_state.as_mut()) {
            (Some(auth_cfg), Some(state)) => {
                let key = auth_cfg.key_store.current();
                auth::sign(&mut packet, &key, state, &mut buf, self.config.padded_pdu_size)
                    .map_err(|e| e.to_string())
            }
            _ => packet
                .marshal(&mut buf, self.config.padded_pdu_size)
                .map_err(|e| e.to_string()),
        };

        match result {
            Ok(n) => {
                if let Err(e) = self.sender.send(&buf[..n], self.peer_socket_addr()) {
                    warn!(discr = self.local_discriminator, error = %e, "failed to send BFD packet");
                } else {
                    self.packets_sent.fetch_add(1, Ordering::AcqRel);
                    self.metrics.packet_sent(
                        self.peer_socket_addr(),
                        SocketAddr::new(self.config.local_addr, 0),
                    );
                }
            }
            Err(e) => {
                warn!(discr = self.local_discriminator, error = %e, "failed to marshal BFD packet");
            }
        }
    }

    fn on_rx(&self, packet: ControlPacket, wire: Option<Bytes>, auth_state: &mut Option<AuthState>) {
        if packet.auth_present() || self.config.auth.is_some() {
            match (&self.config.auth, auth_state.as_mut(), &wire) {
                (Some(auth_cfg), Some(state), Some(wire)) => {
                    let key = match auth_cfg.key_store.lookup(
                        packet.auth.as_ref().map(|a| a.key_id()).unwrap_or(0),
                    ) {
                        Ok(key) => key,
                        Err(e) => {
                            warn!(discr = self.local_discriminator, error = %e, "auth key lookup failed");
                            return;
                        }
                    };
                    if let Err(e) = auth::verify(
                        &packet,
                        wire,
                        &key,
                        state,
                        self.config.detect_multiplier,
                    ) {
                        warn!(discr = self.local_discriminator, error = %e, "packet failed authentication");
                        self.metrics.packet_dropped(
                            self.peer_socket_addr(),
                            SocketAddr::new(self.config.local_addr, 0),
                            "auth",
                        );
                        return;
                    }
                }
                _ => {
                    warn!(discr = self.local_discriminator, "received packet could not be authenticated");
                    return;
                }
            }
        }

        self.remote_state.store(packet.state as u8, Ordering::Release);
        self.remote_discriminator.store(packet.my_discriminator, Ordering::Release);
        self.remote_required_min_rx_interval
            .store(packet.required_min_rx_interval, Ordering::Release);
        self.remote_desired_min_tx_interval
            .store(packet.desired_min_tx_interval, Ordering::Release);
        self.remote_detect_mult.store(packet.detect_mult, Ordering::Release);

        let event = fsm::event_for_received_state(packet.state);
        self.apply_event(event);

        self.packets_received.fetch_add(1, Ordering::AcqRel);
        self.last_packet_received.store(now_millis(), Ordering::Release);
        self.metrics.packet_received(
            self.peer_socket_addr(),
            SocketAddr::new(self.config.local_addr, 0),
        );
    }
}

fn state_from_u8_or_down(raw: u8) -> State {
    num_traits::FromPrimitive::from_u8(raw).unwrap_or(State::Down)
}

fn state_name(state: State) -> &'static str {
    match state {
        State::AdminDown => "adminDown",
        State::Down => "down",
        State::Init => "init",
        State::Up => "up",
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn millis_to_time(millis: u64) -> Option<SystemTime> {
    if millis == 0 {
        None
    } else {
        Some(UNIX_EPOCH + Duration::from_millis(millis))
    }
}

/// Drives `session` until `cancel` fires or its inbound channel closes.
///
/// Exactly three suspension points per cycle: the TX deadline, the
/// detection deadline (only armed once the peer is known), and the
/// inbound queue.
pub async fn run(
    session: Arc<Session>,
    cancel: CancelToken,
    mut inbound_rx: mpsc::Receiver<Inbound>,
) {
    let _span = debug_span!("session", discr = session.local_discriminator).entered();

    let mut auth_state = session
        .config
        .auth
        .as_ref()
        .map(|cfg| AuthState::new(cfg.auth_type));
    let mut poll_in_progress = false;

    let mut next_tx_at = Instant::now();
    let mut next_detect_at = Instant::now() + Duration::from_secs(3600);

    loop {
        let detect_armed = session.peer_known() && session.state() != State::AdminDown;

        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            _ = tokio::time::sleep_until(next_tx_at) => {
                session.transmit(poll_in_progress, false, &mut auth_state);
                let interval = session.negotiated_tx_interval();
                next_tx_at = Instant::now() + session.jittered(interval);
            }
            _ = tokio::time::sleep_until(next_detect_at), if detect_armed => {
                session.apply_event(fsm::Event::TimerExpired);
                if let Some(state) = auth_state.as_mut() {
                    state.reset_rx_window();
                }
                // Disarm until the next inbound packet re-arms the deadline;
                // otherwise this branch would stay ready forever and starve
                // inbound_rx.
                next_detect_at = Instant::now() + Duration::from_secs(3600);
            }
            msg = inbound_rx.recv() => {
                match msg {
                    Some(Inbound::Packet { packet, wire }) => {
                        let poll_requested = packet.poll();
                        let final_received = packet.final_();
                        session.on_rx(packet, wire, &mut auth_state);

                        if session.peer_known() {
                            next_detect_at = Instant::now()
                                + Duration::from_micros(session.detection_time_us() as u64);
                        }
                        if final_received {
                            poll_in_progress = false;
                        }
                        if poll_requested {
                            session.transmit(false, true, &mut auth_state);
                        }
                    }
                    Some(Inbound::AdminDownSet) => {
                        session.apply_event(fsm::Event::AdminDownSet);
                    }
                    None => break,
                }
            }
        }
    }

    Debug::SessionDelete(session.local_discriminator, &session.key()).log();
}
