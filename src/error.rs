//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, SocketAddr};

use tracing::warn;

use crate::auth::AuthError;
use crate::discriminator::DiscriminatorExhausted;
use crate::packet::DecodeError;
use crate::session::InvalidConfig;

/// Errors surfaced by the session manager to its callers (spec §6/§7).
#[derive(Debug)]
pub enum Error {
    SessionNotFound(u32),
    DuplicateSession(SocketAddr),
    DemuxNoMatch(SocketAddr),
    InvalidPeerAddr(IpAddr),
    DiscriminatorExhausted(DiscriminatorExhausted),
    EchoSessionNotFound(u32),
    EchoDemuxNoMatch(SocketAddr),
    MicroBfdGroupNotFound(String),
    MicroBfdGroupExists(String),
    UnsolicitedDisabled,
    UnsolicitedInterfaceNotEnabled(String),
    UnsolicitedPrefixDenied(IpAddr),
    UnsolicitedMaxSessions,
    InvalidConfig(InvalidConfig),
    PacketDecodeError(DecodeError),
    AuthError(AuthError),
}

impl Error {
    pub fn log(&self) {
        match self {
            Error::SessionNotFound(discr) => warn!(%discr, "{}", self),
            Error::DuplicateSession(addr) => warn!(%addr, "{}", self),
            Error::DemuxNoMatch(addr) => warn!(%addr, "{}", self),
            Error::InvalidPeerAddr(addr) => warn!(%addr, "{}", self),
            Error::DiscriminatorExhausted(..) => warn!("{}", self),
            Error::EchoSessionNotFound(discr) => warn!(%discr, "{}", self),
            Error::EchoDemuxNoMatch(addr) => warn!(%addr, "{}", self),
            Error::MicroBfdGroupNotFound(name) => warn!(%name, "{}", self),
            Error::MicroBfdGroupExists(name) => warn!(%name, "{}", self),
            Error::UnsolicitedDisabled => warn!("{}", self),
            Error::UnsolicitedInterfaceNotEnabled(name) => {
                warn!(%name, "{}", self)
            }
            Error::UnsolicitedPrefixDenied(addr) => warn!(%addr, "{}", self),
            Error::UnsolicitedMaxSessions => warn!("{}", self),
            Error::InvalidConfig(inner) => {
                warn!(error = %with_source(inner), "{}", self)
            }
            Error::PacketDecodeError(inner) => {
                warn!(error = %with_source(inner), "{}", self)
            }
            Error::AuthError(inner) => {
                warn!(error = %with_source(inner), "{}", self)
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SessionNotFound(..) => write!(f, "session not found"),
            Error::DuplicateSession(..) => write!(f, "session already exists"),
            Error::DemuxNoMatch(..) => write!(f, "no session matches packet"),
            Error::InvalidPeerAddr(..) => write!(f, "invalid peer address"),
            Error::DiscriminatorExhausted(..) => {
                write!(f, "discriminator allocation exhausted")
            }
            Error::EchoSessionNotFound(..) => write!(f, "echo session not found"),
            Error::EchoDemuxNoMatch(..) => {
                write!(f, "no echo session matches packet")
            }
            Error::MicroBfdGroupNotFound(..) => {
                write!(f, "micro-BFD group not found")
            }
            Error::MicroBfdGroupExists(..) => {
                write!(f, "micro-BFD group already exists")
            }
            Error::UnsolicitedDisabled => {
                write!(f, "unsolicited BFD is disabled")
            }
            Error::UnsolicitedInterfaceNotEnabled(..) => {
                write!(f, "unsolicited BFD not enabled on interface")
            }
            Error::UnsolicitedPrefixDenied(..) => {
                write!(f, "source address denied by unsolicited policy")
            }
            Error::UnsolicitedMaxSessions => {
                write!(f, "unsolicited session limit reached")
            }
            Error::InvalidConfig(..) => write!(f, "invalid session configuration"),
            Error::PacketDecodeError(..) => write!(f, "failed to decode packet"),
            Error::AuthError(..) => write!(f, "failed to authenticate packet"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DiscriminatorExhausted(inner) => Some(inner),
            Error::InvalidConfig(inner) => Some(inner),
            Error::PacketDecodeError(inner) => Some(inner),
            Error::AuthError(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<DiscriminatorExhausted> for Error {
    fn from(error: DiscriminatorExhausted) -> Error {
        Error::DiscriminatorExhausted(error)
    }
}

impl From<InvalidConfig> for Error {
    fn from(error: InvalidConfig) -> Error {
        Error::InvalidConfig(error)
    }
}

impl From<DecodeError> for Error {
    fn from(error: DecodeError) -> Error {
        Error::PacketDecodeError(error)
    }
}

impl From<AuthError> for Error {
    fn from(error: AuthError) -> Error {
        Error::AuthError(error)
    }
}

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
