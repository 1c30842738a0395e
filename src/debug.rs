//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span};

use crate::packet::State;
use crate::session::SessionKey;

/// BFD debug messages, rendered through `tracing` at `debug` level.
#[derive(Debug)]
pub enum Debug<'a> {
    SessionCreate(u32, &'a SessionKey),
    SessionDelete(u32, &'a SessionKey),
    UnsolicitedSessionCreate(u32, &'a SessionKey),
    FsmTransition(u32, State, State),
    DetectionTimeExpiry(u32),
    PollSequenceStart(u32),
    PollSequenceEnd(u32),
    AuthSeqReset(u32),
    MicroBfdAggregateChange(&'a str, bool),
}

impl Debug<'_> {
    pub(crate) fn log(&self) {
        match self {
            Debug::SessionCreate(discr, key)
            | Debug::SessionDelete(discr, key)
            | Debug::UnsolicitedSessionCreate(discr, key) => {
                debug_span!("session", discr = discr, peer = %key.peer_addr)
                    .in_scope(|| {
                        debug!("{}", self);
                    });
            }
            Debug::FsmTransition(discr, old_state, new_state) => {
                debug_span!("session", discr = discr).in_scope(|| {
                    debug!(?old_state, ?new_state, "{}", self);
                });
            }
            Debug::DetectionTimeExpiry(discr)
            | Debug::PollSequenceStart(discr)
            | Debug::PollSequenceEnd(discr)
            | Debug::AuthSeqReset(discr) => {
                debug_span!("session", discr = discr).in_scope(|| {
                    debug!("{}", self);
                });
            }
            Debug::MicroBfdAggregateChange(lag, aggregate_up) => {
                debug_span!("group", lag = lag).in_scope(|| {
                    debug!(aggregate_up, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::SessionCreate(..) => write!(f, "session created"),
            Debug::SessionDelete(..) => write!(f, "session deleted"),
            Debug::UnsolicitedSessionCreate(..) => {
                write!(f, "unsolicited session auto-created")
            }
            Debug::FsmTransition(..) => write!(f, "state transition"),
            Debug::DetectionTimeExpiry(..) => {
                write!(f, "detection timer expired")
            }
            Debug::PollSequenceStart(..) => write!(f, "poll sequence started"),
            Debug::PollSequenceEnd(..) => write!(f, "poll sequence ended"),
            Debug::AuthSeqReset(..) => {
                write!(f, "authentication sequence window reset")
            }
            Debug::MicroBfdAggregateChange(..) => {
                write!(f, "micro-BFD aggregate state changed")
            }
        }
    }
}
