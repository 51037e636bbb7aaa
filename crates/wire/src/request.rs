//! Typed subdoc requests
//!
//! Decodes the three request shapes of the subdocument surface out of a
//! deframed [`RequestPacket`]:
//!
//! - multi-lookup (0xd0): extras = optional doc flags (1);
//!   value = repeated `opcode(1) flags(1) pathlen(2) path`
//! - multi-mutation (0xd1): extras = optional expiry (4) and/or doc
//!   flags (1); value = repeated
//!   `opcode(1) flags(1) pathlen(2) valuelen(4) path value`
//! - single-path (0xc5..=0xcf, 0xd2): extras = pathlen(2) pathflags(1)
//!   [expiry(4)]; value = path then payload
//!
//! Every request type can encode itself back to wire bytes; the encoders
//! exist for the round-trip tests and for embedding the mock in driver test
//! suites that need to forge traffic.

use byteorder::{BigEndian, ByteOrder};
use smallvec::SmallVec;

use mockbase_core::types::{DOC_FLAG_MKDOC, PATH_FLAG_XATTR};
use mockbase_core::KeySpec;
use mockbase_subdoc::Operation;

use crate::error::CodecError;
use crate::packet::{RequestHeader, RequestPacket, OP_SUBDOC_MULTI_LOOKUP, OP_SUBDOC_MULTI_MUTATION};

/// Expiry values up to this many seconds are relative to "now"; larger
/// values are absolute epoch seconds (30 days, the memcached convention).
pub const RELATIVE_EXPIRY_LIMIT: u32 = 30 * 24 * 60 * 60;

/// Convert a wire expiry value to absolute epoch seconds.
pub fn absolute_expiry(raw: u32) -> u32 {
    if raw == 0 || raw > RELATIVE_EXPIRY_LIMIT {
        raw
    } else {
        let now = mockbase_core::Timestamp::now().as_secs() as u32;
        now.saturating_add(raw)
    }
}

/// One operation within a multi request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSpec {
    /// Classified operation (unknown opcodes classify to `Unknown`)
    pub op: Operation,
    /// Per-spec path flags
    pub flags: u8,
    /// Addressing path
    pub path: String,
    /// Mutation payload (empty for lookups)
    pub value: String,
}

impl MultiSpec {
    /// Whether this spec targets the xattr namespace.
    pub fn is_xattr(&self) -> bool {
        self.flags & PATH_FLAG_XATTR != 0
    }
}

/// Decoded multi-lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLookupRequest {
    /// Target key
    pub key: KeySpec,
    /// Correlation token
    pub opaque: u32,
    /// Document-level flags
    pub doc_flags: u8,
    /// Ordered lookup specs
    pub specs: SmallVec<[MultiSpec; 8]>,
}

/// Decoded multi-mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMutationRequest {
    /// Target key
    pub key: KeySpec,
    /// CAS precondition (0 = none)
    pub cas: u64,
    /// Correlation token
    pub opaque: u32,
    /// Document-level flags
    pub doc_flags: u8,
    /// Expiry override (raw wire value); `None` inherits the stored expiry
    pub expiry: Option<u32>,
    /// Ordered mutation specs
    pub specs: SmallVec<[MultiSpec; 8]>,
}

impl MultiLookupRequest {
    /// Decode from a deframed packet.
    pub fn decode(packet: &RequestPacket) -> Result<Self, CodecError> {
        let doc_flags = match packet.extras.len() {
            0 => 0,
            1 => packet.extras[0],
            len => {
                return Err(CodecError::InvalidExtras {
                    opcode: packet.header.opcode,
                    len,
                })
            }
        };
        Ok(MultiLookupRequest {
            key: KeySpec::new(packet.key.clone(), packet.header.vbucket),
            opaque: packet.header.opaque,
            doc_flags,
            specs: decode_lookup_specs(&packet.value)?,
        })
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut value = Vec::new();
        for spec in &self.specs {
            value.push(spec.op.opcode());
            value.push(spec.flags);
            let mut len = [0u8; 2];
            BigEndian::write_u16(&mut len, spec.path.len() as u16);
            value.extend_from_slice(&len);
            value.extend_from_slice(spec.path.as_bytes());
        }
        let extras: Vec<u8> = if self.doc_flags != 0 {
            vec![self.doc_flags]
        } else {
            Vec::new()
        };
        frame(
            OP_SUBDOC_MULTI_LOOKUP,
            &self.key,
            0,
            self.opaque,
            extras,
            value,
        )
    }
}

impl MultiMutationRequest {
    /// Decode from a deframed packet.
    pub fn decode(packet: &RequestPacket) -> Result<Self, CodecError> {
        let (expiry, doc_flags) = match packet.extras.len() {
            0 => (None, 0),
            1 => (None, packet.extras[0]),
            4 => (Some(BigEndian::read_u32(&packet.extras)), 0),
            5 => (
                Some(BigEndian::read_u32(&packet.extras[..4])),
                packet.extras[4],
            ),
            len => {
                return Err(CodecError::InvalidExtras {
                    opcode: packet.header.opcode,
                    len,
                })
            }
        };
        Ok(MultiMutationRequest {
            key: KeySpec::new(packet.key.clone(), packet.header.vbucket),
            cas: packet.header.cas,
            opaque: packet.header.opaque,
            doc_flags,
            expiry,
            specs: decode_mutation_specs(&packet.value)?,
        })
    }

    /// Whether the request may create a missing document.
    pub fn has_mkdoc(&self) -> bool {
        self.doc_flags & DOC_FLAG_MKDOC != 0
    }

    /// Expiry for the committed item: the request's override (converted to
    /// absolute seconds) or the stored item's value.
    pub fn new_expiry(&self, existing: u32) -> u32 {
        match self.expiry {
            None => existing,
            Some(raw) => absolute_expiry(raw),
        }
    }

    /// Serialized empty root for document creation, inferred from the first
    /// spec's path shape. `None` when the request carries no specs.
    pub fn root_body(&self) -> Option<&'static str> {
        let first = self.specs.first()?;
        if first.path.starts_with('[') {
            Some("[]")
        } else {
            Some("{}")
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut value = Vec::new();
        for spec in &self.specs {
            value.push(spec.op.opcode());
            value.push(spec.flags);
            let mut lens = [0u8; 6];
            BigEndian::write_u16(&mut lens[0..2], spec.path.len() as u16);
            BigEndian::write_u32(&mut lens[2..6], spec.value.len() as u32);
            value.extend_from_slice(&lens);
            value.extend_from_slice(spec.path.as_bytes());
            value.extend_from_slice(spec.value.as_bytes());
        }
        let mut extras = Vec::new();
        if let Some(expiry) = self.expiry {
            let mut raw = [0u8; 4];
            BigEndian::write_u32(&mut raw, expiry);
            extras.extend_from_slice(&raw);
        }
        if self.doc_flags != 0 {
            extras.push(self.doc_flags);
        }
        frame(
            OP_SUBDOC_MULTI_MUTATION,
            &self.key,
            self.cas,
            self.opaque,
            extras,
            value,
        )
    }
}

/// Decoded single-path subdoc request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdocRequest {
    /// Classified operation
    pub op: Operation,
    /// Target key
    pub key: KeySpec,
    /// CAS precondition (0 = none)
    pub cas: u64,
    /// Correlation token
    pub opaque: u32,
    /// Per-spec path flags
    pub path_flags: u8,
    /// Expiry override (raw wire value)
    pub expiry: Option<u32>,
    /// Addressing path
    pub path: String,
    /// Mutation payload (empty for lookups)
    pub value: String,
}

impl SubdocRequest {
    /// Decode from a deframed packet.
    pub fn decode(packet: &RequestPacket) -> Result<Self, CodecError> {
        let (path_len, path_flags, expiry) = match packet.extras.len() {
            3 => (
                usize::from(BigEndian::read_u16(&packet.extras[0..2])),
                packet.extras[2],
                None,
            ),
            7 => (
                usize::from(BigEndian::read_u16(&packet.extras[0..2])),
                packet.extras[2],
                Some(BigEndian::read_u32(&packet.extras[3..7])),
            ),
            len => {
                return Err(CodecError::InvalidExtras {
                    opcode: packet.header.opcode,
                    len,
                })
            }
        };
        if packet.value.len() < path_len {
            return Err(CodecError::Truncated {
                have: packet.value.len(),
                need: path_len,
            });
        }
        let path = std::str::from_utf8(&packet.value[..path_len])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        let value = std::str::from_utf8(&packet.value[path_len..])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        Ok(SubdocRequest {
            op: Operation::classify(packet.header.opcode),
            key: KeySpec::new(packet.key.clone(), packet.header.vbucket),
            cas: packet.header.cas,
            opaque: packet.header.opaque,
            path_flags,
            expiry,
            path,
            value,
        })
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut extras = Vec::with_capacity(7);
        let mut path_len = [0u8; 2];
        BigEndian::write_u16(&mut path_len, self.path.len() as u16);
        extras.extend_from_slice(&path_len);
        extras.push(self.path_flags);
        if let Some(expiry) = self.expiry {
            let mut raw = [0u8; 4];
            BigEndian::write_u32(&mut raw, expiry);
            extras.extend_from_slice(&raw);
        }
        let mut value = Vec::with_capacity(self.path.len() + self.value.len());
        value.extend_from_slice(self.path.as_bytes());
        value.extend_from_slice(self.value.as_bytes());
        frame(self.op.opcode(), &self.key, self.cas, self.opaque, extras, value)
    }
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn frame(
    opcode: u8,
    key: &KeySpec,
    cas: u64,
    opaque: u32,
    extras: Vec<u8>,
    value: Vec<u8>,
) -> Vec<u8> {
    let packet = RequestPacket {
        header: RequestHeader {
            opcode,
            key_len: key.key().len() as u16,
            extras_len: extras.len() as u8,
            datatype: 0,
            vbucket: key.vbucket(),
            body_len: (extras.len() + key.key().len() + value.len()) as u32,
            opaque,
            cas,
        },
        extras,
        key: key.key().to_string(),
        value,
    };
    packet.encode()
}

fn decode_lookup_specs(buf: &[u8]) -> Result<SmallVec<[MultiSpec; 8]>, CodecError> {
    let mut specs = SmallVec::new();
    let mut pos = 0;
    while pos < buf.len() {
        if buf.len() - pos < 4 {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: 4,
            });
        }
        let opcode = buf[pos];
        let flags = buf[pos + 1];
        let path_len = usize::from(BigEndian::read_u16(&buf[pos + 2..pos + 4]));
        pos += 4;
        if buf.len() - pos < path_len {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: path_len,
            });
        }
        let path = std::str::from_utf8(&buf[pos..pos + path_len])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        pos += path_len;
        specs.push(MultiSpec {
            op: Operation::classify(opcode),
            flags,
            path,
            value: String::new(),
        });
    }
    Ok(specs)
}

fn decode_mutation_specs(buf: &[u8]) -> Result<SmallVec<[MultiSpec; 8]>, CodecError> {
    let mut specs = SmallVec::new();
    let mut pos = 0;
    while pos < buf.len() {
        if buf.len() - pos < 8 {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: 8,
            });
        }
        let opcode = buf[pos];
        let flags = buf[pos + 1];
        let path_len = usize::from(BigEndian::read_u16(&buf[pos + 2..pos + 4]));
        let value_len = BigEndian::read_u32(&buf[pos + 4..pos + 8]) as usize;
        pos += 8;
        if buf.len() - pos < path_len + value_len {
            return Err(CodecError::Truncated {
                have: buf.len() - pos,
                need: path_len + value_len,
            });
        }
        let path = std::str::from_utf8(&buf[pos..pos + path_len])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        pos += path_len;
        let value = std::str::from_utf8(&buf[pos..pos + value_len])
            .map_err(|_| CodecError::InvalidString)?
            .to_string();
        pos += value_len;
        specs.push(MultiSpec {
            op: Operation::classify(opcode),
            flags,
            path,
            value,
        });
    }
    Ok(specs)
}
