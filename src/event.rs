//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Types that cross the boundary between sessions, the manager, and the
//! embedder: demux metadata on the way in, state-change notifications on
//! the way out.

use std::net::{IpAddr, SocketAddr};
use std::time::SystemTime;

use crate::capabilities::SessionTypeName;
use crate::packet::{DiagnosticCode, State};

/// Per-packet metadata the transport populates before handing a decoded
/// packet to the manager for demux.
///
/// Single-hop sessions require the transport to have already enforced
/// `ttl == 255` (GTSM, RFC 5082) and interface equality; multi-hop sessions
/// do not check TTL or interface and leave `if_name` empty.
#[derive(Clone, Debug)]
pub struct PacketMeta {
    pub src_addr: IpAddr,
    pub dst_addr: IpAddr,
    pub ttl: u8,
    pub if_name: String,
}

/// Emitted whenever a session (control, echo, or micro-BFD member)
/// transitions state.
#[derive(Clone, Debug)]
pub struct StateChange {
    pub local_discr: u32,
    pub peer: SocketAddr,
    pub old_state: State,
    pub new_state: State,
    pub diag: DiagnosticCode,
    pub interface: String,
    pub session_type: SessionTypeName,
    pub timestamp: SystemTime,
}
