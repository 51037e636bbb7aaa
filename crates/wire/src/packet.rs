//! Packet framing: the 24-byte binary header
//!
//! # Header Layout (big-endian)
//!
//! ```text
//! ┌───────────┬───────────┬───────────────┬───────────────┐
//! │ magic (1) │ opcode (1)│ key length (2)│ extras len (1)│
//! ├───────────┼───────────┴───────────────┼───────────────┤
//! │ dtype (1) │ vbucket / status (2)      │ body len (4)  │
//! ├───────────┴───────────────────────────┴───────────────┤
//! │ opaque (4)                                            │
//! ├───────────────────────────────────────────────────────┤
//! │ cas (8)                                               │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! `body len` counts extras + key + value. The vbucket field doubles as the
//! status field in responses.

use byteorder::{BigEndian, ByteOrder};

use crate::error::CodecError;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Magic byte of a request packet.
pub const MAGIC_REQUEST: u8 = 0x80;
/// Magic byte of a response packet.
pub const MAGIC_RESPONSE: u8 = 0x81;

/// Opcode of a multi-path lookup command.
pub const OP_SUBDOC_MULTI_LOOKUP: u8 = 0xd0;
/// Opcode of a multi-path mutation command.
pub const OP_SUBDOC_MULTI_MUTATION: u8 = 0xd1;

/// Decoded request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Command opcode
    pub opcode: u8,
    /// Length of the key field
    pub key_len: u16,
    /// Length of the extras field
    pub extras_len: u8,
    /// Data type (unused by this engine, carried through)
    pub datatype: u8,
    /// vbucket the client routed the key to
    pub vbucket: u16,
    /// Total body length: extras + key + value
    pub body_len: u32,
    /// Client correlation token, echoed in the response
    pub opaque: u32,
    /// CAS precondition (0 = none)
    pub cas: u64,
}

impl RequestHeader {
    /// Serialize to the 24-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = MAGIC_REQUEST;
        buf[1] = self.opcode;
        BigEndian::write_u16(&mut buf[2..4], self.key_len);
        buf[4] = self.extras_len;
        buf[5] = self.datatype;
        BigEndian::write_u16(&mut buf[6..8], self.vbucket);
        BigEndian::write_u32(&mut buf[8..12], self.body_len);
        BigEndian::write_u32(&mut buf[12..16], self.opaque);
        BigEndian::write_u64(&mut buf[16..24], self.cas);
        buf
    }

    /// Parse the 24-byte wire form.
    pub fn decode(buf: &[u8]) -> Result<RequestHeader, CodecError> {
        if buf.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                have: buf.len(),
                need: HEADER_SIZE,
            });
        }
        if buf[0] != MAGIC_REQUEST {
            return Err(CodecError::BadMagic(buf[0]));
        }
        Ok(RequestHeader {
            opcode: buf[1],
            key_len: BigEndian::read_u16(&buf[2..4]),
            extras_len: buf[4],
            datatype: buf[5],
            vbucket: BigEndian::read_u16(&buf[6..8]),
            body_len: BigEndian::read_u32(&buf[8..12]),
            opaque: BigEndian::read_u32(&buf[12..16]),
            cas: BigEndian::read_u64(&buf[16..24]),
        })
    }
}

/// Decoded response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Command opcode this responds to
    pub opcode: u8,
    /// Length of the key field (always 0 on this surface)
    pub key_len: u16,
    /// Length of the extras field
    pub extras_len: u8,
    /// Data type (carried through)
    pub datatype: u8,
    /// Status code
    pub status: u16,
    /// Total body length: extras + key + value
    pub body_len: u32,
    /// Correlation token from the request
    pub opaque: u32,
    /// CAS of the item after the operation (0 when not applicable)
    pub cas: u64,
}

impl ResponseHeader {
    /// Serialize to the 24-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = MAGIC_RESPONSE;
        buf[1] = self.opcode;
        BigEndian::write_u16(&mut buf[2..4], self.key_len);
        buf[4] = self.extras_len;
        buf[5] = self.datatype;
        BigEndian::write_u16(&mut buf[6..8], self.status);
        BigEndian::write_u32(&mut buf[8..12], self.body_len);
        BigEndian::write_u32(&mut buf[12..16], self.opaque);
        BigEndian::write_u64(&mut buf[16..24], self.cas);
        buf
    }

    /// Parse the 24-byte wire form.
    pub fn decode(buf: &[u8]) -> Result<ResponseHeader, CodecError> {
        if buf.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                have: buf.len(),
                need: HEADER_SIZE,
            });
        }
        if buf[0] != MAGIC_RESPONSE {
            return Err(CodecError::BadMagic(buf[0]));
        }
        Ok(ResponseHeader {
            opcode: buf[1],
            key_len: BigEndian::read_u16(&buf[2..4]),
            extras_len: buf[4],
            datatype: buf[5],
            status: BigEndian::read_u16(&buf[6..8]),
            body_len: BigEndian::read_u32(&buf[8..12]),
            opaque: BigEndian::read_u32(&buf[12..16]),
            cas: BigEndian::read_u64(&buf[16..24]),
        })
    }
}

/// A deframed request: header plus the three body sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    /// The fixed header
    pub header: RequestHeader,
    /// Extras bytes
    pub extras: Vec<u8>,
    /// Key, decoded as UTF-8
    pub key: String,
    /// Value bytes (everything after extras and key)
    pub value: Vec<u8>,
}

impl RequestPacket {
    /// Deframe one request from a complete packet buffer.
    pub fn decode(buf: &[u8]) -> Result<RequestPacket, CodecError> {
        let header = RequestHeader::decode(buf)?;
        let body_len = header.body_len as usize;
        let need = HEADER_SIZE + body_len;
        if buf.len() < need {
            return Err(CodecError::Truncated {
                have: buf.len(),
                need,
            });
        }
        let extras_len = usize::from(header.extras_len);
        let key_len = usize::from(header.key_len);
        if extras_len + key_len > body_len {
            return Err(CodecError::LengthMismatch {
                extras: extras_len,
                key: key_len,
                body: body_len,
            });
        }
        let body = &buf[HEADER_SIZE..need];
        let extras = body[..extras_len].to_vec();
        let key = std::str::from_utf8(&body[extras_len..extras_len + key_len])
            .map_err(|_| CodecError::InvalidKey)?
            .to_string();
        let value = body[extras_len + key_len..].to_vec();
        Ok(RequestPacket {
            header,
            extras,
            key,
            value,
        })
    }

    /// Frame this packet back into wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.header.body_len as usize);
        out.extend_from_slice(&self.header.encode());
        out.extend_from_slice(&self.extras);
        out.extend_from_slice(self.key.as_bytes());
        out.extend_from_slice(&self.value);
        out
    }
}
