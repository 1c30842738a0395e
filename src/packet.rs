//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! BFD Control Packet codec (RFC 5880 §4, RFC 9764 padding).
//!
//! Generic BFD Control Packet Format:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |Vers |  Diag   |Sta|P|F|C|A|D|M|  Detect Mult  |    Length     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       My Discriminator                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Your Discriminator                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Desired Min TX Interval                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                   Required Min RX Interval                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Required Min Echo RX Interval                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Size in bytes of the mandatory (non-authenticated) section.
pub const MANDATORY_SECTION_LEN: u8 = 24;
/// Minimum size in bytes of an authenticated mandatory section.
pub const MANDATORY_SECTION_LEN_AUTH: u8 = 26;
/// Smallest configurable padded PDU size (RFC 9764).
pub const MIN_PADDED_PDU_SIZE: u16 = 24;
/// Largest configurable padded PDU size (RFC 9764).
pub const MAX_PADDED_PDU_SIZE: u16 = 9000;

/// BFD session state (RFC 5880 §4.1).
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum State {
    AdminDown = 0,
    Down = 1,
    Init = 2,
    Up = 3,
}

/// BFD Diagnostic Codes.
///
/// IANA registry:
/// <https://www.iana.org/assignments/bfd-parameters/bfd-parameters.xhtml#bfd-parameters-1>
#[derive(Clone, Copy, Debug, Default, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DiagnosticCode {
    #[default]
    None = 0,
    ControlTimeExpired = 1,
    EchoFailed = 2,
    NeighborDown = 3,
    ForwardingPlaneReset = 4,
    PathDown = 5,
    ConcatPathDown = 6,
    AdminDown = 7,
    ReverseConcatPathDown = 8,
}

/// BFD Authentication Types (RFC 5880 §4.1).
///
/// IANA registry:
/// <https://www.iana.org/assignments/bfd-parameters/bfd-parameters.xhtml#bfd-parameters-2>
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AuthType {
    SimplePassword = 1,
    KeyedMd5 = 2,
    MeticulousKeyedMd5 = 3,
    KeyedSha1 = 4,
    MeticulousKeyedSha1 = 5,
}

bitflags! {
    /// BFD packet flags (low 6 bits of the second header byte).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct PacketFlags: u8 {
        const POLL = 1 << 5;
        const FINAL = 1 << 4;
        const CONTROL_PLANE_INDEPENDENT = 1 << 3;
        const AUTH_PRESENT = 1 << 2;
        const DEMAND = 1 << 1;
        const MULTIPOINT = 1 << 0;
    }
}

impl AuthType {
    /// Fixed `Auth Len` value for the digest-carrying variants; `None` for
    /// Simple Password, whose length is a function of the password size.
    pub fn fixed_auth_len(self) -> Option<u8> {
        match self {
            AuthType::SimplePassword => None,
            AuthType::KeyedMd5 | AuthType::MeticulousKeyedMd5 => Some(24),
            AuthType::KeyedSha1 | AuthType::MeticulousKeyedSha1 => Some(28),
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            AuthType::SimplePassword => 0,
            AuthType::KeyedMd5 | AuthType::MeticulousKeyedMd5 => 16,
            AuthType::KeyedSha1 | AuthType::MeticulousKeyedSha1 => 20,
        }
    }

    pub fn is_meticulous(self) -> bool {
        matches!(
            self,
            AuthType::MeticulousKeyedMd5 | AuthType::MeticulousKeyedSha1
        )
    }

    pub fn is_md5(self) -> bool {
        matches!(self, AuthType::KeyedMd5 | AuthType::MeticulousKeyedMd5)
    }
}

/// Decoded authentication section (RFC 5880 §4.2-§4.4).
///
/// `password`/`digest` are [`Bytes`] slices that may alias the buffer the
/// packet was decoded from (zero-copy). Callers that hand the source buffer
/// back to a pool must copy these out first, or complete verification while
/// the original buffer is still alive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthSection {
    Password {
        key_id: u8,
        password: Bytes,
    },
    Digest {
        auth_type: AuthType,
        key_id: u8,
        sequence_number: u32,
        digest: Bytes,
    },
}

impl AuthSection {
    pub fn auth_type(&self) -> AuthType {
        match self {
            AuthSection::Password { .. } => AuthType::SimplePassword,
            AuthSection::Digest { auth_type, .. } => *auth_type,
        }
    }

    pub fn key_id(&self) -> u8 {
        match self {
            AuthSection::Password { key_id, .. } => *key_id,
            AuthSection::Digest { key_id, .. } => *key_id,
        }
    }

    /// Length of the auth section on the wire, including the 3-byte header.
    fn wire_len(&self) -> u8 {
        match self {
            AuthSection::Password { password, .. } => 3 + password.len() as u8,
            AuthSection::Digest { auth_type, .. } => {
                auth_type.fixed_auth_len().unwrap()
            }
        }
    }
}

/// Decoded BFD Control Packet.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPacket {
    pub version: u8,
    pub diag: DiagnosticCode,
    pub state: State,
    pub flags: PacketFlags,
    pub detect_mult: u8,
    pub my_discriminator: u32,
    pub your_discriminator: u32,
    pub desired_min_tx_interval: u32,
    pub required_min_rx_interval: u32,
    pub required_min_echo_rx_interval: u32,
    pub auth: Option<AuthSection>,
}

impl ControlPacket {
    pub const VERSION: u8 = 1;

    pub fn poll(&self) -> bool {
        self.flags.contains(PacketFlags::POLL)
    }

    pub fn final_(&self) -> bool {
        self.flags.contains(PacketFlags::FINAL)
    }

    pub fn auth_present(&self) -> bool {
        self.flags.contains(PacketFlags::AUTH_PRESENT)
    }

    /// Computes the mandatory + auth-section length this packet requires,
    /// not counting any RFC 9764 padding.
    fn pdu_len(&self) -> u8 {
        let mut len = MANDATORY_SECTION_LEN;
        if let Some(auth) = &self.auth {
            len += auth.wire_len();
        }
        len
    }

    /// The unpadded wire length of this packet (the value the `Length`
    /// field carries), regardless of any RFC 9764 padding applied on send.
    pub fn encoded_len(&self) -> usize {
        self.pdu_len() as usize
    }

    /// Marshals the packet into `buf` in network byte order, optionally
    /// zero-padding to `padded_pdu_size` (RFC 9764; `0` disables padding).
    ///
    /// Returns the number of bytes written (the padded size when padding is
    /// active, otherwise the unpadded PDU size).
    pub fn marshal(
        &self,
        buf: &mut [u8],
        padded_pdu_size: u16,
    ) -> Result<usize, EncodeError> {
        let pdu_len = self.pdu_len();
        let total_len = std::cmp::max(pdu_len as usize, padded_pdu_size as usize);
        if buf.len() < total_len {
            return Err(EncodeError::BufferTooSmall {
                needed: total_len,
                available: buf.len(),
            });
        }

        {
            let mut cursor = &mut buf[..];
            cursor.put_u8((self.version << 5) | (self.diag as u8));
            cursor.put_u8(((self.state as u8) << 6) | self.flags.bits());
            cursor.put_u8(self.detect_mult);
            cursor.put_u8(pdu_len);
            cursor.put_u32(self.my_discriminator);
            cursor.put_u32(self.your_discriminator);
            cursor.put_u32(self.desired_min_tx_interval);
            cursor.put_u32(self.required_min_rx_interval);
            cursor.put_u32(self.required_min_echo_rx_interval);

            if let Some(auth) = &self.auth {
                match auth {
                    AuthSection::Password { key_id, password } => {
                        cursor.put_u8(AuthType::SimplePassword as u8);
                        cursor.put_u8(auth.wire_len());
                        cursor.put_u8(*key_id);
                        cursor.put_slice(password);
                    }
                    AuthSection::Digest {
                        auth_type,
                        key_id,
                        sequence_number,
                        digest,
                    } => {
                        cursor.put_u8(*auth_type as u8);
                        cursor.put_u8(auth.wire_len());
                        cursor.put_u8(*key_id);
                        cursor.put_u8(0); // Reserved.
                        cursor.put_u32(*sequence_number);
                        let want = auth_type.digest_len();
                        cursor.put_slice(&digest[..digest.len().min(want)]);
                        if digest.len() < want {
                            cursor.put_bytes(0, want - digest.len());
                        }
                    }
                }
            }
        }

        // RFC 9764: padding bytes beyond the BFD length field are zero and
        // invisible to the protocol.
        if total_len > pdu_len as usize {
            buf[pdu_len as usize..total_len].fill(0);
        }

        Ok(total_len)
    }

    /// Unmarshals a packet from `data`, validating per RFC 5880 §6.8.6.
    ///
    /// Trailing bytes beyond the decoded `length` field are accepted and
    /// ignored (RFC 9764): a receiver must not reject a padded PDU.
    pub fn unmarshal(data: &[u8]) -> Result<ControlPacket, DecodeError> {
        if data.len() < MANDATORY_SECTION_LEN as usize {
            return Err(DecodeError::PacketTooShort);
        }

        // Work off a single refcounted copy so that auth password/digest
        // slices can alias it without further copies.
        let owned = Bytes::copy_from_slice(data);
        let mut cursor = owned.clone();

        let first_byte = cursor.get_u8();
        let second_byte = cursor.get_u8();
        let version = first_byte >> 5;
        if version != ControlPacket::VERSION {
            return Err(DecodeError::InvalidVersion(version));
        }
        let diag_raw = first_byte & 0x1F;
        let diag = DiagnosticCode::from_u8(diag_raw).unwrap_or_default();
        let state = State::from_u8(second_byte >> 6)
            .expect("2-bit field always maps to a valid State");
        let flags = PacketFlags::from_bits_truncate(second_byte & 0x3F);
        let detect_mult = cursor.get_u8();
        let length = cursor.get_u8();

        let auth_present = flags.contains(PacketFlags::AUTH_PRESENT);
        let min_len = if auth_present {
            MANDATORY_SECTION_LEN_AUTH
        } else {
            MANDATORY_SECTION_LEN
        };
        if length < min_len {
            return Err(DecodeError::InvalidLength(length));
        }
        if length as usize > data.len() {
            return Err(DecodeError::LengthExceedsPayload(length));
        }
        if detect_mult == 0 {
            return Err(DecodeError::ZeroDetectMult);
        }
        if flags.contains(PacketFlags::MULTIPOINT) {
            return Err(DecodeError::MultipointSet);
        }

        let my_discriminator = cursor.get_u32();
        if my_discriminator == 0 {
            return Err(DecodeError::ZeroMyDiscriminator);
        }
        let your_discriminator = cursor.get_u32();
        if your_discriminator == 0
            && !matches!(state, State::Down | State::AdminDown)
        {
            return Err(DecodeError::ZeroYourDiscriminator);
        }
        let desired_min_tx_interval = cursor.get_u32();
        let required_min_rx_interval = cursor.get_u32();
        let required_min_echo_rx_interval = cursor.get_u32();

        let auth = if auth_present {
            Some(decode_auth_section(&owned, &mut cursor, length)?)
        } else {
            None
        };

        Ok(ControlPacket {
            version,
            diag,
            state,
            flags,
            detect_mult,
            my_discriminator,
            your_discriminator,
            desired_min_tx_interval,
            required_min_rx_interval,
            required_min_echo_rx_interval,
            auth,
        })
    }
}

fn decode_auth_section(
    owned: &Bytes,
    cursor: &mut Bytes,
    length: u8,
) -> Result<AuthSection, DecodeError> {
    if cursor.remaining() < 3 {
        return Err(DecodeError::AuthSectionTruncated);
    }
    let auth_type_raw = cursor.get_u8();
    let auth_len = cursor.get_u8();
    let key_id = cursor.get_u8();

    if MANDATORY_SECTION_LEN.saturating_add(auth_len) > length {
        return Err(DecodeError::AuthSectionTruncated);
    }
    let Some(auth_type) = AuthType::from_u8(auth_type_raw) else {
        return Err(DecodeError::InvalidAuthType(auth_type_raw));
    };

    // Offset of the auth section payload (after the 3-byte header) inside
    // `owned`, used to build zero-copy slices.
    let header_consumed = owned.len() - cursor.remaining();

    match auth_type {
        AuthType::SimplePassword => {
            if !(4..=19).contains(&auth_len) {
                return Err(DecodeError::InvalidAuthLength(auth_len));
            }
            let password_len = auth_len as usize - 3;
            if cursor.remaining() < password_len {
                return Err(DecodeError::AuthSectionTruncated);
            }
            let password =
                owned.slice(header_consumed..header_consumed + password_len);
            cursor.advance(password_len);
            Ok(AuthSection::Password { key_id, password })
        }
        AuthType::KeyedMd5
        | AuthType::MeticulousKeyedMd5
        | AuthType::KeyedSha1
        | AuthType::MeticulousKeyedSha1 => {
            let expected = auth_type.fixed_auth_len().unwrap();
            if auth_len != expected {
                return Err(DecodeError::InvalidAuthLength(auth_len));
            }
            // Reserved(1) + Sequence Number(4).
            if cursor.remaining() < 5 {
                return Err(DecodeError::AuthSectionTruncated);
            }
            let _reserved = cursor.get_u8();
            let sequence_number = cursor.get_u32();
            let digest_len = auth_type.digest_len();
            if cursor.remaining() < digest_len {
                return Err(DecodeError::AuthSectionTruncated);
            }
            let digest_offset = owned.len() - cursor.remaining();
            let digest =
                owned.slice(digest_offset..digest_offset + digest_len);
            cursor.advance(digest_len);
            Ok(AuthSection::Digest {
                auth_type,
                key_id,
                sequence_number,
                digest,
            })
        }
    }
}

/// Errors returned while marshaling a packet into a buffer.
#[derive(Debug, Eq, PartialEq)]
pub enum EncodeError {
    BufferTooSmall { needed: usize, available: usize },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::BufferTooSmall { needed, available } => write!(
                f,
                "buffer too small: need {needed} bytes, have {available}"
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// BFD packet decode errors (RFC 5880 §6.8.6).
#[derive(Debug, Eq, PartialEq)]
pub enum DecodeError {
    PacketTooShort,
    InvalidVersion(u8),
    InvalidLength(u8),
    LengthExceedsPayload(u8),
    ZeroDetectMult,
    MultipointSet,
    ZeroMyDiscriminator,
    ZeroYourDiscriminator,
    AuthSectionTruncated,
    InvalidAuthType(u8),
    InvalidAuthLength(u8),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::PacketTooShort => write!(f, "packet shorter than the mandatory section"),
            DecodeError::InvalidVersion(v) => write!(f, "invalid BFD version: {v}"),
            DecodeError::InvalidLength(len) => write!(f, "invalid packet length field: {len}"),
            DecodeError::LengthExceedsPayload(len) => {
                write!(f, "length field {len} exceeds received payload")
            }
            DecodeError::ZeroDetectMult => write!(f, "zero detect multiplier"),
            DecodeError::MultipointSet => write!(f, "multipoint bit set"),
            DecodeError::ZeroMyDiscriminator => write!(f, "zero My Discriminator"),
            DecodeError::ZeroYourDiscriminator => write!(f, "zero Your Discriminator in non-Down state"),
            DecodeError::AuthSectionTruncated => write!(f, "authentication section truncated"),
            DecodeError::InvalidAuthType(t) => write!(f, "invalid authentication type: {t}"),
            DecodeError::InvalidAuthLength(len) => write!(f, "invalid authentication length: {len}"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_packet() -> ControlPacket {
        ControlPacket {
            version: 1,
            diag: DiagnosticCode::None,
            state: State::Up,
            flags: PacketFlags::empty(),
            detect_mult: 3,
            my_discriminator: 0x9fb205d6,
            your_discriminator: 0x4a2357dc,
            desired_min_tx_interval: 300_000,
            required_min_rx_interval: 300_000,
            required_min_echo_rx_interval: 50_000,
            auth: None,
        }
    }

    #[test]
    fn encode_matches_reference_bytes() {
        let packet = base_packet();
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(n, 24);
        let expected: [u8; 24] = [
            0x20, 0xc0, 0x03, 0x18, 0x9f, 0xb2, 0x05, 0xd6, 0x4a, 0x23, 0x57,
            0xdc, 0x00, 0x04, 0x93, 0xe0, 0x00, 0x04, 0x93, 0xe0, 0x00, 0x00,
            0xc3, 0x50,
        ];
        assert_eq!(&buf[..24], &expected[..]);
    }

    #[test]
    fn round_trip() {
        let packet = base_packet();
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        let decoded = ControlPacket::unmarshal(&buf[..n]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn buffer_too_small() {
        let packet = base_packet();
        let mut buf = [0u8; 4];
        assert_eq!(
            packet.marshal(&mut buf, 0),
            Err(EncodeError::BufferTooSmall {
                needed: 24,
                available: 4
            })
        );
    }

    #[test]
    fn rejects_short_packet() {
        assert_eq!(
            ControlPacket::unmarshal(&[0u8; 10]),
            Err(DecodeError::PacketTooShort)
        );
    }

    #[test]
    fn rejects_bad_version() {
        let mut buf = [0u8; 24];
        base_packet().marshal(&mut buf, 0).unwrap();
        buf[0] = 0x40 | (buf[0] & 0x1F); // version = 2
        assert_eq!(
            ControlPacket::unmarshal(&buf),
            Err(DecodeError::InvalidVersion(2))
        );
    }

    #[test]
    fn rejects_zero_detect_mult() {
        let mut packet = base_packet();
        packet.detect_mult = 0;
        let mut buf = [0u8; 24];
        packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(
            ControlPacket::unmarshal(&buf),
            Err(DecodeError::ZeroDetectMult)
        );
    }

    #[test]
    fn rejects_multipoint() {
        let mut packet = base_packet();
        packet.flags.insert(PacketFlags::MULTIPOINT);
        let mut buf = [0u8; 24];
        packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(
            ControlPacket::unmarshal(&buf),
            Err(DecodeError::MultipointSet)
        );
    }

    #[test]
    fn rejects_zero_my_discriminator() {
        let mut packet = base_packet();
        packet.my_discriminator = 0;
        let mut buf = [0u8; 24];
        packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(
            ControlPacket::unmarshal(&buf),
            Err(DecodeError::ZeroMyDiscriminator)
        );
    }

    #[test]
    fn allows_zero_your_discriminator_when_down() {
        let mut packet = base_packet();
        packet.your_discriminator = 0;
        packet.state = State::Down;
        let mut buf = [0u8; 24];
        let n = packet.marshal(&mut buf, 0).unwrap();
        assert!(ControlPacket::unmarshal(&buf[..n]).is_ok());
    }

    #[test]
    fn rejects_zero_your_discriminator_when_up() {
        let mut packet = base_packet();
        packet.your_discriminator = 0;
        packet.state = State::Up;
        let mut buf = [0u8; 24];
        packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(
            ControlPacket::unmarshal(&buf),
            Err(DecodeError::ZeroYourDiscriminator)
        );
    }

    #[test]
    fn accepts_trailing_padding_bytes() {
        let packet = base_packet();
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 32).unwrap();
        assert_eq!(n, 32);
        assert!(buf[24..32].iter().all(|&b| b == 0));
        let decoded = ControlPacket::unmarshal(&buf[..n]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn simple_password_round_trip() {
        let mut packet = base_packet();
        packet.flags.insert(PacketFlags::AUTH_PRESENT);
        packet.auth = Some(AuthSection::Password {
            key_id: 7,
            password: Bytes::from_static(b"hunter2"),
        });
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(n, 24 + 3 + 7);
        let decoded = ControlPacket::unmarshal(&buf[..n]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn md5_auth_round_trip() {
        let mut packet = base_packet();
        packet.flags.insert(PacketFlags::AUTH_PRESENT);
        packet.auth = Some(AuthSection::Digest {
            auth_type: AuthType::MeticulousKeyedMd5,
            key_id: 1,
            sequence_number: 42,
            digest: Bytes::from(vec![0xab; 16]),
        });
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(n, 24 + 24);
        let decoded = ControlPacket::unmarshal(&buf[..n]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn sha1_auth_round_trip() {
        let mut packet = base_packet();
        packet.flags.insert(PacketFlags::AUTH_PRESENT);
        packet.auth = Some(AuthSection::Digest {
            auth_type: AuthType::KeyedSha1,
            key_id: 9,
            sequence_number: 7,
            digest: Bytes::from(vec![0x11; 20]),
        });
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        assert_eq!(n, 24 + 28);
        let decoded = ControlPacket::unmarshal(&buf[..n]).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn rejects_auth_length_mismatch() {
        let mut packet = base_packet();
        packet.flags.insert(PacketFlags::AUTH_PRESENT);
        packet.auth = Some(AuthSection::Digest {
            auth_type: AuthType::KeyedMd5,
            key_id: 1,
            sequence_number: 1,
            digest: Bytes::from(vec![0; 16]),
        });
        let mut buf = [0u8; 64];
        let n = packet.marshal(&mut buf, 0).unwrap();
        // Corrupt the auth len field (byte 25).
        buf[25] = 99;
        assert_eq!(
            ControlPacket::unmarshal(&buf[..n]),
            Err(DecodeError::AuthSectionTruncated)
        );
    }
}
