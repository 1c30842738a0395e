//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! BFD cryptographic authentication (RFC 5880 §6.7): Simple Password, Keyed
//! MD5, Meticulous Keyed MD5, Keyed SHA1, and Meticulous Keyed SHA1, with
//! sequence-window replay protection.

use bytes::Bytes;
use md5::{Digest as _, Md5};
use rand::Rng;
use sha1::Sha1;

use crate::packet::{
    AuthSection, AuthType, ControlPacket, MANDATORY_SECTION_LEN, PacketFlags,
};

/// A configured authentication key.
#[derive(Clone, Debug)]
pub struct AuthKey {
    pub id: u8,
    pub auth_type: AuthType,
    pub secret: Vec<u8>,
}

impl AuthKey {
    pub fn new(
        id: u8,
        auth_type: AuthType,
        secret: Vec<u8>,
    ) -> Result<Self, AuthError> {
        let max_len = match auth_type {
            AuthType::SimplePassword
            | AuthType::KeyedMd5
            | AuthType::MeticulousKeyedMd5 => 16,
            AuthType::KeyedSha1 | AuthType::MeticulousKeyedSha1 => 20,
        };
        if secret.is_empty() || secret.len() > max_len {
            return Err(AuthError::AuthLenMismatch);
        }
        Ok(AuthKey {
            id,
            auth_type,
            secret,
        })
    }
}

/// Per-session authentication sequence-number bookkeeping.
///
/// `rcv_auth_seq`/`auth_seq_known` protect against replay on the receive
/// side; `xmit_auth_seq` is the session's own outbound sequence counter.
#[derive(Clone, Copy, Debug)]
pub struct AuthState {
    pub auth_type: AuthType,
    pub rcv_auth_seq: u32,
    pub xmit_auth_seq: u32,
    pub auth_seq_known: bool,
}

impl AuthState {
    pub fn new(auth_type: AuthType) -> Self {
        AuthState {
            auth_type,
            rcv_auth_seq: 0,
            xmit_auth_seq: rand::rng().random(),
            auth_seq_known: false,
        }
    }

    /// Invoked from the detection-timeout path after 2x the detection time
    /// has elapsed with no packets received (RFC 5880 §6.8.1).
    pub fn reset_rx_window(&mut self) {
        self.auth_seq_known = false;
    }
}

/// Authentication failure taxonomy.
#[derive(Debug, Eq, PartialEq)]
pub enum AuthError {
    AuthKeyNotFound,
    AuthTypeMismatch,
    AuthLenMismatch,
    AuthPasswordMismatch,
    AuthDigestMismatch,
    AuthSeqOutOfWindow,
    AuthMissingSection,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::AuthKeyNotFound => write!(f, "authentication key not found"),
            AuthError::AuthTypeMismatch => write!(f, "authentication type mismatch"),
            AuthError::AuthLenMismatch => write!(f, "authentication length mismatch"),
            AuthError::AuthPasswordMismatch => write!(f, "password mismatch"),
            AuthError::AuthDigestMismatch => write!(f, "digest mismatch"),
            AuthError::AuthSeqOutOfWindow => write!(f, "sequence number outside replay window"),
            AuthError::AuthMissingSection => write!(f, "authentication section missing"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Returns true iff `seq` lies in the inclusive window `[lo, hi]` under
/// 32-bit unsigned modular arithmetic (handles wraparound).
pub fn seq_in_window(seq: u32, lo: u32, hi: u32) -> bool {
    seq.wrapping_sub(lo) <= hi.wrapping_sub(lo)
}

fn key_padded(secret: &[u8], width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    let n = secret.len().min(width);
    buf[..n].copy_from_slice(&secret[..n]);
    buf
}

fn compute_digest(auth_type: AuthType, data: &[u8]) -> Vec<u8> {
    if auth_type.is_md5() {
        let mut hasher = Md5::new();
        hasher.update(data);
        hasher.finalize().to_vec()
    } else {
        let mut hasher = Sha1::new();
        hasher.update(data);
        hasher.finalize().to_vec()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Offset of the digest/password bytes within a marshaled auth section that
/// carries a sequence number (MD5/SHA1 variants).
const DIGEST_HEADER_LEN: usize = 8; // type+len+key_id(3) + reserved(1) + seq(4)

/// Signs `packet` with `key`, writing it into `buf` and returning the total
/// number of bytes written (including RFC 9764 padding, if any).
///
/// Mutates `packet.auth` and, for digest auth types, `auth_state`.
pub fn sign(
    packet: &mut ControlPacket,
    key: &AuthKey,
    auth_state: &mut AuthState,
    buf: &mut [u8],
    padded_pdu_size: u16,
) -> Result<usize, crate::packet::EncodeError> {
    packet.flags.insert(PacketFlags::AUTH_PRESENT);

    match key.auth_type {
        AuthType::SimplePassword => {
            packet.auth = Some(AuthSection::Password {
                key_id: key.id,
                password: Bytes::from(key.secret.clone()),
            });
            packet.marshal(buf, padded_pdu_size)
        }
        auth_type => {
            auth_state.xmit_auth_seq = auth_state.xmit_auth_seq.wrapping_add(1);
            let digest_len = auth_type.digest_len();
            packet.auth = Some(AuthSection::Digest {
                auth_type,
                key_id: key.id,
                sequence_number: auth_state.xmit_auth_seq,
                digest: Bytes::from(key_padded(&key.secret, digest_len)),
            });
            let n = packet.marshal(buf, padded_pdu_size)?;
            let pdu_len = packet.encoded_len();
            let digest_offset = MANDATORY_SECTION_LEN as usize + DIGEST_HEADER_LEN;
            let digest = compute_digest(auth_type, &buf[..pdu_len]);
            buf[digest_offset..digest_offset + digest_len]
                .copy_from_slice(&digest);
            packet.auth = Some(AuthSection::Digest {
                auth_type,
                key_id: key.id,
                sequence_number: auth_state.xmit_auth_seq,
                digest: Bytes::from(digest),
            });
            Ok(n)
        }
    }
}

/// Verifies `packet`'s authentication section against `key` and `wire`, the
/// raw bytes the packet was decoded from. `detect_mult` is the local
/// session's configured detect multiplier, used to size the replay window.
///
/// On success, advances `auth_state`'s receive-sequence bookkeeping.
pub fn verify(
    packet: &ControlPacket,
    wire: &[u8],
    key: &AuthKey,
    auth_state: &mut AuthState,
    detect_mult: u8,
) -> Result<(), AuthError> {
    let Some(auth) = &packet.auth else {
        return Err(AuthError::AuthMissingSection);
    };
    if auth.auth_type() != key.auth_type {
        return Err(AuthError::AuthTypeMismatch);
    }
    if auth.key_id() != key.id {
        return Err(AuthError::AuthKeyNotFound);
    }

    match auth {
        AuthSection::Password { password, .. } => {
            if password.len() != key.secret.len() {
                return Err(AuthError::AuthLenMismatch);
            }
            if !constant_time_eq(password, &key.secret) {
                return Err(AuthError::AuthPasswordMismatch);
            }
            Ok(())
        }
        AuthSection::Digest {
            auth_type,
            sequence_number,
            digest,
            ..
        } => {
            if auth_state.auth_seq_known {
                let lo = if auth_type.is_meticulous() {
                    auth_state.rcv_auth_seq.wrapping_add(1)
                } else {
                    auth_state.rcv_auth_seq
                };
                let hi = auth_state
                    .rcv_auth_seq
                    .wrapping_add(3u32.saturating_mul(detect_mult as u32));
                if !seq_in_window(*sequence_number, lo, hi) {
                    return Err(AuthError::AuthSeqOutOfWindow);
                }
            }

            let pdu_len = packet.encoded_len();
            if wire.len() < pdu_len {
                return Err(AuthError::AuthLenMismatch);
            }
            let mut scratch = wire[..pdu_len].to_vec();
            let digest_len = auth_type.digest_len();
            let digest_offset =
                MANDATORY_SECTION_LEN as usize + DIGEST_HEADER_LEN;
            if scratch.len() < digest_offset + digest_len {
                return Err(AuthError::AuthLenMismatch);
            }
            scratch[digest_offset..digest_offset + digest_len]
                .copy_from_slice(&key_padded(&key.secret, digest_len));
            let computed = compute_digest(*auth_type, &scratch);
            if !constant_time_eq(&computed, digest) {
                return Err(AuthError::AuthDigestMismatch);
            }

            auth_state.rcv_auth_seq = *sequence_number;
            auth_state.auth_seq_known = true;
            Ok(())
        }
    }
}
