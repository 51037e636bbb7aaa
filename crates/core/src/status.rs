//! Binary-protocol status codes
//!
//! Statuses are wire data, not Rust errors: they travel in the 2-byte status
//! field of a response header and inside per-spec result payloads. The enum is
//! closed and every variant carries its protocol value explicitly.

use std::fmt;

/// Status code carried in response headers and per-spec results.
///
/// Values are the memcached binary protocol codes, including the
/// subdocument extension family (0xc0..=0xcc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    /// Operation succeeded
    Success = 0x0000,
    /// Key not found
    KeyNotFound = 0x0001,
    /// Key exists (also: CAS mismatch on a CAS-checked mutation)
    KeyExists = 0x0002,
    /// Value too large
    TooBig = 0x0003,
    /// Invalid request arguments
    InvalidArguments = 0x0004,
    /// Item not stored
    NotStored = 0x0005,
    /// Non-numeric value for an arithmetic operation
    DeltaBadValue = 0x0006,
    /// The vbucket in the request does not belong to this node
    NotMyVbucket = 0x0007,
    /// Authentication failure
    AuthError = 0x0020,
    /// Value outside legal range
    OutOfRange = 0x0022,
    /// Opcode is not recognized
    UnknownCommand = 0x0081,
    /// Out of memory
    OutOfMemory = 0x0082,
    /// Operation is not supported
    NotSupported = 0x0083,
    /// Temporary failure, retry later
    TemporaryFailure = 0x0086,

    /// Subdoc: path does not exist in the document
    SubdocPathNotFound = 0x00c0,
    /// Subdoc: path conflicts with the document structure
    SubdocPathMismatch = 0x00c1,
    /// Subdoc: path syntax is invalid
    SubdocPathInvalid = 0x00c2,
    /// Subdoc: path has too many components
    SubdocPathTooDeep = 0x00c3,
    /// Subdoc: document nesting exceeds the depth limit
    SubdocDocTooDeep = 0x00c4,
    /// Subdoc: value cannot be inserted at the given position
    SubdocValueCantInsert = 0x00c5,
    /// Subdoc: document is not valid JSON
    SubdocDocNotJson = 0x00c6,
    /// Subdoc: arithmetic result is outside the numeric range
    SubdocNumOutOfRange = 0x00c7,
    /// Subdoc: arithmetic delta is invalid
    SubdocDeltaOutOfRange = 0x00c8,
    /// Subdoc: path already exists
    SubdocPathExists = 0x00c9,
    /// Subdoc: inserting the value would exceed the depth limit
    SubdocValueTooDeep = 0x00ca,
    /// Subdoc: operation/request combination is invalid
    SubdocInvalidCombo = 0x00cb,
    /// Subdoc: one or more specs in a multi request failed
    SubdocMultiFailure = 0x00cc,
}

impl Status {
    /// Protocol value for the 2-byte status field.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Decode a protocol value. Unlisted values yield `None`.
    pub fn from_u16(value: u16) -> Option<Status> {
        use Status::*;
        Some(match value {
            0x0000 => Success,
            0x0001 => KeyNotFound,
            0x0002 => KeyExists,
            0x0003 => TooBig,
            0x0004 => InvalidArguments,
            0x0005 => NotStored,
            0x0006 => DeltaBadValue,
            0x0007 => NotMyVbucket,
            0x0020 => AuthError,
            0x0022 => OutOfRange,
            0x0081 => UnknownCommand,
            0x0082 => OutOfMemory,
            0x0083 => NotSupported,
            0x0086 => TemporaryFailure,
            0x00c0 => SubdocPathNotFound,
            0x00c1 => SubdocPathMismatch,
            0x00c2 => SubdocPathInvalid,
            0x00c3 => SubdocPathTooDeep,
            0x00c4 => SubdocDocTooDeep,
            0x00c5 => SubdocValueCantInsert,
            0x00c6 => SubdocDocNotJson,
            0x00c7 => SubdocNumOutOfRange,
            0x00c8 => SubdocDeltaOutOfRange,
            0x00c9 => SubdocPathExists,
            0x00ca => SubdocValueTooDeep,
            0x00cb => SubdocInvalidCombo,
            0x00cc => SubdocMultiFailure,
            _ => return None,
        })
    }

    /// Whether this status is `Success`.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Whether this status aborts an entire lookup request rather than a
    /// single spec. Only the two document-level subdoc statuses qualify.
    #[inline]
    pub const fn is_document_fatal(self) -> bool {
        matches!(self, Status::SubdocDocNotJson | Status::SubdocDocTooDeep)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (0x{:04x})", self, self.as_u16())
    }
}
