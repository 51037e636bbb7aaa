//! Operation classifier
//!
//! Closed enumeration of the subdocument opcode family. Every opcode an
//! operation spec can carry maps to exactly one variant; anything else maps
//! to `Unknown`, which is neither lookup- nor mutator-capable. Callers must
//! surface `Unknown` as an unknown-command status, never fall through to a
//! default behavior.

/// A classified subdocument operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch the value at a path
    Get,
    /// Check that a path exists
    Exists,
    /// Count the elements of the container at a path
    GetCount,
    /// Insert a new dictionary key, failing if it exists
    DictAdd,
    /// Insert or overwrite a dictionary key
    DictUpsert,
    /// Remove the value at a path
    Remove,
    /// Overwrite the existing value at a path
    Replace,
    /// Append to the array at a path
    ArrayPushLast,
    /// Prepend to the array at a path
    ArrayPushFirst,
    /// Insert into an array at an explicit position
    ArrayInsert,
    /// Append to an array unless an equal element is present
    ArrayAddUnique,
    /// Add a signed delta to a numeric value
    Counter,
    /// An opcode outside the classified set
    Unknown(u8),
}

impl Operation {
    /// Wire opcode of [`Operation::Get`].
    pub const OP_GET: u8 = 0xc5;
    /// Wire opcode of [`Operation::Exists`].
    pub const OP_EXISTS: u8 = 0xc6;
    /// Wire opcode of [`Operation::DictAdd`].
    pub const OP_DICT_ADD: u8 = 0xc7;
    /// Wire opcode of [`Operation::DictUpsert`].
    pub const OP_DICT_UPSERT: u8 = 0xc8;
    /// Wire opcode of [`Operation::Remove`].
    pub const OP_REMOVE: u8 = 0xc9;
    /// Wire opcode of [`Operation::Replace`].
    pub const OP_REPLACE: u8 = 0xca;
    /// Wire opcode of [`Operation::ArrayPushLast`].
    pub const OP_ARRAY_PUSH_LAST: u8 = 0xcb;
    /// Wire opcode of [`Operation::ArrayPushFirst`].
    pub const OP_ARRAY_PUSH_FIRST: u8 = 0xcc;
    /// Wire opcode of [`Operation::ArrayInsert`].
    pub const OP_ARRAY_INSERT: u8 = 0xcd;
    /// Wire opcode of [`Operation::ArrayAddUnique`].
    pub const OP_ARRAY_ADD_UNIQUE: u8 = 0xce;
    /// Wire opcode of [`Operation::Counter`].
    pub const OP_COUNTER: u8 = 0xcf;
    /// Wire opcode of [`Operation::GetCount`].
    pub const OP_GET_COUNT: u8 = 0xd2;

    /// Classify a wire opcode. Total: unrecognized opcodes become
    /// [`Operation::Unknown`].
    pub fn classify(opcode: u8) -> Operation {
        match opcode {
            Self::OP_GET => Operation::Get,
            Self::OP_EXISTS => Operation::Exists,
            Self::OP_GET_COUNT => Operation::GetCount,
            Self::OP_DICT_ADD => Operation::DictAdd,
            Self::OP_DICT_UPSERT => Operation::DictUpsert,
            Self::OP_REMOVE => Operation::Remove,
            Self::OP_REPLACE => Operation::Replace,
            Self::OP_ARRAY_PUSH_LAST => Operation::ArrayPushLast,
            Self::OP_ARRAY_PUSH_FIRST => Operation::ArrayPushFirst,
            Self::OP_ARRAY_INSERT => Operation::ArrayInsert,
            Self::OP_ARRAY_ADD_UNIQUE => Operation::ArrayAddUnique,
            Self::OP_COUNTER => Operation::Counter,
            other => Operation::Unknown(other),
        }
    }

    /// The wire opcode for this operation.
    pub fn opcode(&self) -> u8 {
        match self {
            Operation::Get => Self::OP_GET,
            Operation::Exists => Self::OP_EXISTS,
            Operation::GetCount => Self::OP_GET_COUNT,
            Operation::DictAdd => Self::OP_DICT_ADD,
            Operation::DictUpsert => Self::OP_DICT_UPSERT,
            Operation::Remove => Self::OP_REMOVE,
            Operation::Replace => Self::OP_REPLACE,
            Operation::ArrayPushLast => Self::OP_ARRAY_PUSH_LAST,
            Operation::ArrayPushFirst => Self::OP_ARRAY_PUSH_FIRST,
            Operation::ArrayInsert => Self::OP_ARRAY_INSERT,
            Operation::ArrayAddUnique => Self::OP_ARRAY_ADD_UNIQUE,
            Operation::Counter => Self::OP_COUNTER,
            Operation::Unknown(op) => *op,
        }
    }

    /// Whether this operation may appear in a lookup request.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Operation::Get | Operation::Exists | Operation::GetCount
        )
    }

    /// Whether this operation may appear in a mutation request.
    pub fn is_mutator(&self) -> bool {
        matches!(
            self,
            Operation::DictAdd
                | Operation::DictUpsert
                | Operation::Remove
                | Operation::Replace
                | Operation::ArrayPushLast
                | Operation::ArrayPushFirst
                | Operation::ArrayInsert
                | Operation::ArrayAddUnique
                | Operation::Counter
        )
    }

    /// Whether a successful application produces a match value.
    pub fn returns_match(&self) -> bool {
        matches!(
            self,
            Operation::Get | Operation::GetCount | Operation::Counter
        )
    }
}
