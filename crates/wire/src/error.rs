//! Codec error type
//!
//! A codec error means the peer violated the framing contract. These are
//! fatal to the connection, never retried, and never surface as protocol
//! statuses.

use thiserror::Error;

/// Error cases for packet encoding/decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer shorter than the layout requires
    #[error("packet truncated: have {have} bytes, need {need}")]
    Truncated {
        /// Bytes available
        have: usize,
        /// Bytes the layout requires
        need: usize,
    },

    /// First byte is not a known magic value
    #[error("bad magic byte 0x{0:02x}")]
    BadMagic(u8),

    /// Header lengths disagree with each other or the buffer
    #[error("inconsistent frame lengths: extras {extras} + key {key} exceed body {body}")]
    LengthMismatch {
        /// Extras length from the header
        extras: usize,
        /// Key length from the header
        key: usize,
        /// Total body length from the header
        body: usize,
    },

    /// Extras field has a length the opcode does not allow
    #[error("invalid extras length {len} for opcode 0x{opcode:02x}")]
    InvalidExtras {
        /// The request opcode
        opcode: u8,
        /// Extras length found
        len: usize,
    },

    /// Key bytes are not valid UTF-8
    #[error("key is not valid UTF-8")]
    InvalidKey,

    /// A path or value field is not valid UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidString,

    /// A status field carries a code outside the known set
    #[error("unknown status code 0x{0:04x}")]
    UnknownStatus(u16),
}

impl From<CodecError> for mockbase_core::Error {
    fn from(e: CodecError) -> Self {
        mockbase_core::Error::Codec(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = CodecError::Truncated { have: 3, need: 24 };
        assert!(e.to_string().contains("3"));
        assert!(e.to_string().contains("24"));

        let e = CodecError::BadMagic(0x42);
        assert!(e.to_string().contains("0x42"));
    }

    #[test]
    fn converts_into_core_error() {
        let e: mockbase_core::Error = CodecError::InvalidKey.into();
        assert!(matches!(e, mockbase_core::Error::Codec(_)));
    }
}
