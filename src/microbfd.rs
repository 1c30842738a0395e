//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 7130 micro-BFD: aggregate liveness for a LAG derived from its member
//! links' individual session states.

use std::collections::HashMap;
use std::net::IpAddr;

use crate::debug::Debug;
use crate::packet::State;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemberState {
    pub state: State,
    pub local_discr: u32,
}

/// Construction/reconfiguration failures (spec §4.7).
#[derive(Debug, Eq, PartialEq)]
pub enum MicroBfdGroupError {
    DuplicateMember(String),
    NoMembers,
    InvalidMinActiveLinks { min_active_links: usize, member_count: usize },
}

impl std::fmt::Display for MicroBfdGroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MicroBfdGroupError::DuplicateMember(name) => {
                write!(f, "duplicate member link `{name}`")
            }
            MicroBfdGroupError::NoMembers => {
                write!(f, "micro-BFD group must have at least one member")
            }
            MicroBfdGroupError::InvalidMinActiveLinks {
                min_active_links,
                member_count,
            } => write!(
                f,
                "min_active_links {min_active_links} out of range [1, {member_count}]"
            ),
        }
    }
}

impl std::error::Error for MicroBfdGroupError {}

/// A LAG aggregate over the member sessions' liveness.
pub struct MicroBfdGroup {
    pub lag_interface: String,
    pub peer_addr: IpAddr,
    pub local_addr: IpAddr,
    pub min_active_links: usize,
    members: HashMap<String, MemberState>,
    up_count: usize,
    aggregate_up: bool,
}

impl MicroBfdGroup {
    pub fn new(
        lag_interface: String,
        peer_addr: IpAddr,
        local_addr: IpAddr,
        member_names: &[String],
        min_active_links: usize,
    ) -> Result<MicroBfdGroup, MicroBfdGroupError> {
        if member_names.is_empty() {
            return Err(MicroBfdGroupError::NoMembers);
        }
        let mut members = HashMap::new();
        for name in member_names {
            if members
                .insert(
                    name.clone(),
                    MemberState {
                        state: State::Down,
                        local_discr: 0,
                    },
                )
                .is_some()
            {
                return Err(MicroBfdGroupError::DuplicateMember(name.clone()));
            }
        }
        if min_active_links == 0 || min_active_links > members.len() {
            return Err(MicroBfdGroupError::InvalidMinActiveLinks {
                min_active_links,
                member_count: members.len(),
            });
        }
        Ok(MicroBfdGroup {
            lag_interface,
            peer_addr,
            local_addr,
            min_active_links,
            members,
            up_count: 0,
            aggregate_up: false,
        })
    }

    pub fn aggregate_up(&self) -> bool {
        self.aggregate_up
    }

    pub fn up_count(&self) -> usize {
        self.up_count
    }

    pub fn member(&self, if_name: &str) -> Option<&MemberState> {
        self.members.get(if_name)
    }

    /// Member link names currently in the group.
    pub fn member_names(&self) -> impl Iterator<Item = &String> {
        self.members.keys()
    }

    /// Records a member link's state change. Returns `true` when the
    /// aggregate's up/down status changed as a result.
    pub fn update_member_state(
        &mut self,
        if_name: &str,
        new_state: State,
        local_discr: u32,
    ) -> bool {
        let Some(member) = self.members.get_mut(if_name) else {
            return false;
        };
        let was_up = member.state == State::Up;
        member.state = new_state;
        member.local_discr = local_discr;
        let is_up = new_state == State::Up;

        if was_up && !is_up {
            self.up_count -= 1;
        } else if !was_up && is_up {
            self.up_count += 1;
        } else {
            return false;
        }

        let was_aggregate_up = self.aggregate_up;
        self.aggregate_up = self.up_count >= self.min_active_links;
        if self.aggregate_up != was_aggregate_up {
            Debug::MicroBfdAggregateChange(&self.lag_interface, self.aggregate_up).log();
            true
        } else {
            false
        }
    }

    pub fn add_member(&mut self, if_name: String) -> Result<(), MicroBfdGroupError> {
        if self.members.contains_key(&if_name) {
            return Err(MicroBfdGroupError::DuplicateMember(if_name));
        }
        self.members.insert(
            if_name,
            MemberState {
                state: State::Down,
                local_discr: 0,
            },
        );
        Ok(())
    }

    /// Removes a member; returns whether the aggregate's up/down status
    /// changed as a result (an Up member leaving may drop the aggregate).
    pub fn remove_member(&mut self, if_name: &str) -> bool {
        let Some(member) = self.members.remove(if_name) else {
            return false;
        };
        if member.state != State::Up {
            return false;
        }
        self.up_count -= 1;
        let was_aggregate_up = self.aggregate_up;
        self.aggregate_up = self.up_count >= self.min_active_links;
        self.aggregate_up != was_aggregate_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond0() -> MicroBfdGroup {
        MicroBfdGroup::new(
            "bond0".to_string(),
            "10.0.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            &["eth0".to_string(), "eth1".to_string(), "eth2".to_string()],
            2,
        )
        .unwrap()
    }

    #[test]
    fn aggregate_sequence_matches_scenario() {
        let mut group = bond0();
        assert!(!group.update_member_state("eth0", State::Up, 1));
        assert!(!group.aggregate_up());
        assert_eq!(group.up_count(), 1);

        assert!(group.update_member_state("eth1", State::Up, 2));
        assert!(group.aggregate_up());
        assert_eq!(group.up_count(), 2);

        assert!(!group.update_member_state("eth2", State::Up, 3));
        assert!(group.aggregate_up());

        assert!(group.update_member_state("eth1", State::Down, 2));
        assert!(!group.aggregate_up());
        assert_eq!(group.up_count(), 1);
    }

    #[test]
    fn rejects_duplicate_members() {
        let err = MicroBfdGroup::new(
            "bond0".to_string(),
            "10.0.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            &["eth0".to_string(), "eth0".to_string()],
            1,
        )
        .unwrap_err();
        assert_eq!(err, MicroBfdGroupError::DuplicateMember("eth0".to_string()));
    }

    #[test]
    fn rejects_empty_members() {
        let err = MicroBfdGroup::new(
            "bond0".to_string(),
            "10.0.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            &[],
            1,
        )
        .unwrap_err();
        assert_eq!(err, MicroBfdGroupError::NoMembers);
    }

    #[test]
    fn rejects_min_active_links_out_of_range() {
        let err = MicroBfdGroup::new(
            "bond0".to_string(),
            "10.0.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            &["eth0".to_string()],
            2,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MicroBfdGroupError::InvalidMinActiveLinks {
                min_active_links: 2,
                member_count: 1
            }
        );
    }

    #[test]
    fn removing_up_member_may_drop_aggregate() {
        let mut group = bond0();
        group.update_member_state("eth0", State::Up, 1);
        group.update_member_state("eth1", State::Up, 2);
        assert!(group.aggregate_up());
        assert!(group.remove_member("eth1"));
        assert!(!group.aggregate_up());
    }
}
