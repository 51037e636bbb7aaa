//! Response packets and the two per-spec payload layouts
//!
//! # Multi-lookup payload
//!
//! One entry per spec, in request order, present for failures too:
//!
//! ```text
//! ┌────────────┬──────────────┬───────────────┐
//! │ status (2) │ length (4)   │ value (bytes) │  × specs
//! └────────────┴──────────────┴───────────────┘
//! ```
//!
//! # Multi-mutation payload
//!
//! Sparse: one entry per match-returning spec on success. On an abort the
//! payload is a single 3-byte entry naming the failing spec.
//!
//! ```text
//! ┌───────────┬────────────┬──[status == success]──┐
//! │ index (1) │ status (2) │ length (4) + value    │  × results
//! └───────────┴────────────┴───────────────────────┘
//! ```

use byteorder::{BigEndian, ByteOrder};

use mockbase_core::{SpecResult, Status};

use crate::error::CodecError;
use crate::packet::{ResponseHeader, HEADER_SIZE};

/// A response ready to be framed onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePacket {
    /// Opcode of the request this answers
    pub opcode: u8,
    /// Top-level status
    pub status: Status,
    /// Correlation token from the request
    pub opaque: u32,
    /// CAS after the operation (0 when not applicable)
    pub cas: u64,
    /// Extras bytes
    pub extras: Vec<u8>,
    /// Value payload
    pub value: Vec<u8>,
}

impl ResponsePacket {
    /// A response carrying only a status.
    pub fn status_only(opcode: u8, opaque: u32, status: Status) -> Self {
        ResponsePacket {
            opcode,
            status,
            opaque,
            cas: 0,
            extras: Vec::new(),
            value: Vec::new(),
        }
    }

    /// A response carrying a status, a CAS and a value payload.
    pub fn with_value(opcode: u8, opaque: u32, status: Status, cas: u64, value: Vec<u8>) -> Self {
        ResponsePacket {
            opcode,
            status,
            opaque,
            cas,
            extras: Vec::new(),
            value,
        }
    }

    /// Frame onto the wire.
    pub fn encode(&self) -> Vec<u8> {
        let header = ResponseHeader {
            opcode: self.opcode,
            key_len: 0,
            extras_len: self.extras.len() as u8,
            datatype: 0,
            status: self.status.as_u16(),
            body_len: (self.extras.len() + self.value.len()) as u32,
            opaque: self.opaque,
            cas: self.cas,
        };
        let mut out = Vec::with_capacity(HEADER_SIZE + self.extras.len() + self.value.len());
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&self.extras);
        out.extend_from_slice(&self.value);
        out
    }

    /// Deframe from wire bytes.
    pub fn decode(buf: &[u8]) -> Result<ResponsePacket, CodecError> {
        let header = ResponseHeader::decode(buf)?;
        let body_len = header.body_len as usize;
        let need = HEADER_SIZE + body_len;
        if buf.len() < need {
            return Err(CodecError::Truncated {
                have: buf.len(),
                need,
            });
        }
        let extras_len = usize::from(header.extras_len);
        if extras_len + usize::from(header.key_len) > body_len {
            return Err(CodecError::LengthMismatch {
                extras: extras_len,
                key: usize::from(header.key_len),
                body: body_len,
            });
        }
        let status =
            Status::from_u16(header.status).ok_or(CodecError::UnknownStatus(header.status))?;
        let body = &buf[HEADER_SIZE..need];
        Ok(ResponsePacket {
            opcode: header.opcode,
            status,
            opaque: header.opaque,
            cas: header.cas,
            extras: body[..extras_len].to_vec(),
            value: body[extras_len + usize::from(header.key_len)..].to_vec(),
        })
    }
}

// ============================================================================
// Multi-lookup payload
// ============================================================================

/// Encode per-spec lookup results, one dense entry per spec.
pub fn encode_lookup_payload(results: &[SpecResult]) -> Vec<u8> {
    let mut out = Vec::new();
    for result in results {
        let value = result.value.as_deref().unwrap_or("");
        let mut head = [0u8; 6];
        BigEndian::write_u16(&mut head[0..2], result.status.as_u16());
        BigEndian::write_u32(&mut head[2..6], value.len() as u32);
        out.extend_from_slice(&head);
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// Decode a multi-lookup payload into (status, value) pairs.
pub fn decode_lookup_payload(buf: &[u8]) -> Result<Vec<(Status, String)>, CodecError> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        if buf.len() - pos < 6 {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: 6,
            });
        }
        let raw_status = BigEndian::read_u16(&buf[pos..pos + 2]);
        let status = Status::from_u16(raw_status).ok_or(CodecError::UnknownStatus(raw_status))?;
        let len = BigEndian::read_u32(&buf[pos + 2..pos + 6]) as usize;
        pos += 6;
        if buf.len() - pos < len {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: len,
            });
        }
        let value = std::str::from_utf8(&buf[pos..pos + len])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        pos += len;
        entries.push((status, value));
    }
    Ok(entries)
}

// ============================================================================
// Multi-mutation payload
// ============================================================================

/// Encode per-spec mutation results (sparse, match-returning specs only).
pub fn encode_mutation_payload(results: &[SpecResult]) -> Vec<u8> {
    let mut out = Vec::new();
    for result in results {
        out.push(result.index as u8);
        let mut status = [0u8; 2];
        BigEndian::write_u16(&mut status, result.status.as_u16());
        out.extend_from_slice(&status);
        if result.status.is_success() {
            let value = result.value.as_deref().unwrap_or("");
            let mut len = [0u8; 4];
            BigEndian::write_u32(&mut len, value.len() as u32);
            out.extend_from_slice(&len);
            out.extend_from_slice(value.as_bytes());
        }
    }
    out
}

/// Encode the abort payload: a single (index, status) entry.
pub fn encode_mutation_failure(index: usize, status: Status) -> Vec<u8> {
    let mut out = Vec::with_capacity(3);
    out.push(index as u8);
    let mut raw = [0u8; 2];
    BigEndian::write_u16(&mut raw, status.as_u16());
    out.extend_from_slice(&raw);
    out
}

/// Decode a multi-mutation payload into (index, status, value) entries.
pub fn decode_mutation_payload(
    buf: &[u8],
) -> Result<Vec<(u8, Status, Option<String>)>, CodecError> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        if buf.len() - pos < 3 {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: 3,
            });
        }
        let index = buf[pos];
        let raw_status = BigEndian::read_u16(&buf[pos + 1..pos + 3]);
        let status = Status::from_u16(raw_status).ok_or(CodecError::UnknownStatus(raw_status))?;
        pos += 3;
        let value = if status.is_success() {
            if buf.len() - pos < 4 {
                return Err(CodecError::Truncated {
                    have: buf.len() - pos,
                    need: 4,
                });
            }
            let len = BigEndian::read_u32(&buf[pos..pos + 4]) as usize;
            pos += 4;
            if buf.len() - pos < len {
                return Err(CodecError::Truncated {
                    have: buf.len() - pos,
                    need: len,
                });
            }
            let value = std::str::from_utf8(&buf[pos..pos + len])
                .map_err(|_| CodecError::InvalidString)?
                .to_string();
            pos += len;
            Some(value)
        } else {
            None
        };
        entries.push((index, status, value));
    }
    Ok(entries)
}
