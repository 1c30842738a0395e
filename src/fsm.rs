//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! The BFD session state machine (RFC 5880 §6.8.6), as a pure transition
//! table: `(state, event) -> (new_state, diag)`. No I/O, no locking; safe to
//! call from any task.

use crate::packet::{DiagnosticCode, State};

/// Events that drive the session state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    RecvAdminDown,
    RecvDown,
    RecvInit,
    RecvUp,
    TimerExpired,
    AdminDownSet,
    AdminDownCleared,
}

/// Applies `event` to `state`, returning the new state and, when the
/// transition lands in `Down`, the diagnostic code that should accompany it.
///
/// Unlisted `(state, event)` combinations are no-ops: the returned state
/// equals the input and the diagnostic is `None`.
pub fn transition(
    state: State,
    event: Event,
) -> (State, DiagnosticCode) {
    use Event::*;
    use State::*;

    if event == AdminDownSet {
        return (AdminDown, DiagnosticCode::AdminDown);
    }
    if event == AdminDownCleared {
        return match state {
            AdminDown => (Down, DiagnosticCode::None),
            other => (other, DiagnosticCode::None),
        };
    }

    match (state, event) {
        (AdminDown, _) => (AdminDown, DiagnosticCode::None),

        (Down, RecvAdminDown) => (Down, DiagnosticCode::AdminDown),
        (Down, RecvDown) => (Init, DiagnosticCode::None),
        (Down, RecvInit) => (Up, DiagnosticCode::None),
        (Down, RecvUp) => (Up, DiagnosticCode::None),

        (Init, RecvAdminDown) => (Down, DiagnosticCode::None),
        (Init, RecvInit) => (Up, DiagnosticCode::None),
        (Init, RecvUp) => (Up, DiagnosticCode::None),
        (Init, TimerExpired) => {
            (Down, DiagnosticCode::ControlTimeExpired)
        }

        (Up, RecvAdminDown) => (Down, DiagnosticCode::NeighborDown),
        (Up, RecvDown) => (Down, DiagnosticCode::NeighborDown),
        (Up, TimerExpired) => {
            (Down, DiagnosticCode::ControlTimeExpired)
        }

        (current, _) => (current, DiagnosticCode::None),
    }
}

/// Maps a received `State` to the FSM event it triggers.
pub fn event_for_received_state(received: State) -> Event {
    match received {
        State::AdminDown => Event::RecvAdminDown,
        State::Down => Event::RecvDown,
        State::Init => Event::RecvInit,
        State::Up => Event::RecvUp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_handshake_transitions() {
        // Down -> Init on RecvDown, Init -> Up on RecvUp.
        let (s, _) = transition(State::Down, Event::RecvDown);
        assert_eq!(s, State::Init);
        let (s, _) = transition(s, Event::RecvUp);
        assert_eq!(s, State::Up);
    }

    #[test]
    fn down_recv_init_jumps_to_up() {
        let (s, d) = transition(State::Down, Event::RecvInit);
        assert_eq!(s, State::Up);
        assert_eq!(d, DiagnosticCode::None);
    }

    #[test]
    fn down_recv_up_jumps_to_up() {
        let (s, d) = transition(State::Down, Event::RecvUp);
        assert_eq!(s, State::Up);
        assert_eq!(d, DiagnosticCode::None);
    }

    #[test]
    fn up_detach_on_neighbor_down() {
        let (s, d) = transition(State::Up, Event::RecvDown);
        assert_eq!(s, State::Down);
        assert_eq!(d, DiagnosticCode::NeighborDown);
    }

    #[test]
    fn timer_expiry_in_up_sets_control_time_expired() {
        let (s, d) = transition(State::Up, Event::TimerExpired);
        assert_eq!(s, State::Down);
        assert_eq!(d, DiagnosticCode::ControlTimeExpired);
    }

    #[test]
    fn timer_expiry_ignored_when_down() {
        let (s, d) = transition(State::Down, Event::TimerExpired);
        assert_eq!(s, State::Down);
        assert_eq!(d, DiagnosticCode::None);
    }

    #[test]
    fn admin_down_is_absorbing_until_cleared() {
        for event in [
            Event::RecvAdminDown,
            Event::RecvDown,
            Event::RecvInit,
            Event::RecvUp,
            Event::TimerExpired,
        ] {
            let (s, _) = transition(State::AdminDown, event);
            assert_eq!(s, State::AdminDown);
        }
        let (s, d) = transition(State::AdminDown, Event::AdminDownCleared);
        assert_eq!(s, State::Down);
        assert_eq!(d, DiagnosticCode::None);
    }

    #[test]
    fn admin_down_set_overrides_any_state() {
        for state in [State::Down, State::Init, State::Up] {
            let (s, d) = transition(state, Event::AdminDownSet);
            assert_eq!(s, State::AdminDown);
            assert_eq!(d, DiagnosticCode::AdminDown);
        }
    }

    #[test]
    fn event_for_received_state_mapping() {
        assert_eq!(
            event_for_received_state(State::AdminDown),
            Event::RecvAdminDown
        );
        assert_eq!(event_for_received_state(State::Down), Event::RecvDown);
        assert_eq!(event_for_received_state(State::Init), Event::RecvInit);
        assert_eq!(event_for_received_state(State::Up), Event::RecvUp);
    }
}
