//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Capabilities the core consumes from its embedder: packet transmission,
//! metrics, and authentication key material. Transport, configuration file
//! parsing, and routing-protocol integration stay on the other side of
//! these traits.

use std::net::SocketAddr;

use crate::auth::{AuthError, AuthKey};

/// Sends a marshaled BFD PDU to `destination`.
///
/// Implementations must be thread-safe (callable concurrently from many
/// session tasks) and must not block the caller for longer than a TX jitter
/// window; BFD's value proposition depends on timely transmission.
pub trait PacketSender: Send + Sync {
    fn send(&self, buffer: &[u8], destination: SocketAddr) -> Result<(), SendError>;
}

#[derive(Debug)]
pub struct SendError(pub std::io::Error);

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to send packet: {}", self.0)
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Session type recorded alongside metrics events.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionTypeName {
    SingleHop,
    MultiHop,
    MicroBfd,
    Echo,
}

impl std::fmt::Display for SessionTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionTypeName::SingleHop => "single-hop",
            SessionTypeName::MultiHop => "multi-hop",
            SessionTypeName::MicroBfd => "micro-bfd",
            SessionTypeName::Echo => "echo",
        };
        write!(f, "{s}")
    }
}

/// Metrics sink consumed by the core; defaults to a no-op so embedding the
/// core never requires a metrics backend.
pub trait MetricsReporter: Send + Sync {
    fn packet_sent(&self, peer: SocketAddr, local: SocketAddr) {
        let _ = (peer, local);
    }

    fn packet_received(&self, peer: SocketAddr, local: SocketAddr) {
        let _ = (peer, local);
    }

    fn packet_dropped(&self, peer: SocketAddr, local: SocketAddr, reason: &str) {
        let _ = (peer, local, reason);
    }

    fn state_transition(
        &self,
        peer: SocketAddr,
        local: SocketAddr,
        from_name: &str,
        to_name: &str,
    ) {
        let _ = (peer, local, from_name, to_name);
    }

    fn session_registered(
        &self,
        peer: SocketAddr,
        local: SocketAddr,
        session_type_name: SessionTypeName,
    ) {
        let _ = (peer, local, session_type_name);
    }

    fn session_unregistered(
        &self,
        peer: SocketAddr,
        local: SocketAddr,
        session_type_name: SessionTypeName,
    ) {
        let _ = (peer, local, session_type_name);
    }
}

/// [`MetricsReporter`] that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsReporter;

impl MetricsReporter for NoopMetricsReporter {}

/// Supplies authentication keys to a session.
pub trait AuthKeyStore: Send + Sync {
    /// Looks up a key by its wire `key_id`.
    fn lookup(&self, key_id: u8) -> Result<AuthKey, AuthError>;

    /// The key currently selected for signing outbound packets.
    fn current(&self) -> AuthKey;
}

/// [`AuthKeyStore`] backed by a single fixed key, useful for tests and for
/// sessions configured with exactly one key (the common case).
#[derive(Clone, Debug)]
pub struct SingleKeyStore(pub AuthKey);

impl AuthKeyStore for SingleKeyStore {
    fn lookup(&self, key_id: u8) -> Result<AuthKey, AuthError> {
        if self.0.id == key_id {
            Ok(self.0.clone())
        } else {
            Err(AuthError::AuthKeyNotFound)
        }
    }

    fn current(&self) -> AuthKey {
        self.0.clone()
    }
}
