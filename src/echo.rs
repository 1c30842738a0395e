//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 9747 Echo sessions: self-addressed PDUs looped back by the peer's
//! forwarding plane, independent of the control-packet state machine.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use tracing::warn;

use crate::capabilities::{MetricsReporter, PacketSender, SessionTypeName};
use crate::event::StateChange;
use crate::manager::CancelToken;
use crate::packet::{DiagnosticCode, State};

/// Immutable echo session configuration.
#[derive(Clone)]
pub struct EchoConfig {
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    pub interface: String,
    /// Microseconds.
    pub tx_interval: u32,
    pub detect_multiplier: u8,
}

pub struct EchoSession {
    pub local_discriminator: u32,
    pub config: EchoConfig,
    sender: Arc<dyn PacketSender>,
    metrics: Arc<dyn MetricsReporter>,
    notify_tx: mpsc::Sender<StateChange>,

    state: AtomicU8,
    packets_sent: AtomicU64,
    packets_received: AtomicU64,
    last_echo_received: AtomicU64,
    detect_reset: Notify,
}

impl EchoSession {
    pub fn new(
        config: EchoConfig,
        discriminator: u32,
        sender: Arc<dyn PacketSender>,
        notify_tx: mpsc::Sender<StateChange>,
        metrics: Arc<dyn MetricsReporter>,
    ) -> Arc<EchoSession> {
        Arc::new(EchoSession {
            local_discriminator: discriminator,
            config,
            sender,
            metrics,
            notify_tx,
            state: AtomicU8::new(State::Down as u8),
            packets_sent: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            last_echo_received: AtomicU64::new(0),
            detect_reset: Notify::new(),
        })
    }

    pub fn state(&self) -> State {
        num_traits::FromPrimitive::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(State::Down)
    }

    pub fn detection_time(&self) -> Duration {
        Duration::from_micros(
            self.config.tx_interval as u64 * self.config.detect_multiplier as u64,
        )
    }

    fn peer_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.peer_addr, 3785)
    }

    /// Delivers a looped-back echo PDU, resetting the detection timer.
    pub fn recv_echo(&self) {
        self.packets_received.fetch_add(1, Ordering::AcqRel);
        self.last_echo_received.store(now_millis(), Ordering::Release);
        if self.state() != State::Up {
            self.set_state(State::Up, DiagnosticCode::None);
        }
        self.detect_reset.notify_one();
    }

    fn set_state(&self, new_state: State, diag: DiagnosticCode) {
        let old_raw = self.state.swap(new_state as u8, Ordering::AcqRel);
        let old_state: State =
            num_traits::FromPrimitive::from_u8(old_raw).unwrap_or(State::Down);
        if old_state == new_state {
            return;
        }
        let change = StateChange {
            local_discr: self.local_discriminator,
            peer: self.peer_socket_addr(),
            old_state,
            new_state,
            diag,
            interface: self.config.interface.clone(),
            session_type: SessionTypeName::Echo,
            timestamp: SystemTime::now(),
        };
        if self.notify_tx.try_send(change).is_err() {
            warn!(discr = self.local_discriminator, "echo state-change notification dropped");
        }
    }

    fn transmit(&self) {
        // Echo PDUs carry no negotiation state; a 24-byte placeholder PDU
        // addressed to ourselves via the peer's forwarding plane suffices.
        let buf = [0u8; 24];
        if self.sender.send(&buf, self.peer_socket_addr()).is_ok() {
            self.packets_sent.fetch_add(1, Ordering::AcqRel);
            self.metrics.packet_sent(
                self.peer_socket_addr(),
                SocketAddr::new(self.config.local_addr, 0),
            );
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Drives an echo session: jittered transmit loop plus a detection timer
/// that flips the session Down with `EchoFailed` on expiry.
pub async fn run(session: Arc<EchoSession>, cancel: CancelToken) {
    let mut next_tx_at = Instant::now();
    let mut next_detect_at = Instant::now() + session.detection_time();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep_until(next_tx_at) => {
                session.transmit();
                next_tx_at = Instant::now()
                    + Duration::from_micros(session.config.tx_interval as u64);
            }
            _ = tokio::time::sleep_until(next_detect_at) => {
                session.set_state(State::Down, DiagnosticCode::EchoFailed);
                next_detect_at = Instant::now() + session.detection_time();
            }
            _ = session.detect_reset.notified() => {
                next_detect_at = Instant::now() + session.detection_time();
            }
        }
    }
}
