//! Binary wire protocol: framing, request decoding, response encoding
//!
//! The protocol is the memcached binary layout: a fixed 24-byte big-endian
//! header followed by extras, key and value. This crate owns the exact byte
//! layouts; it performs no I/O and holds no state. Requests decode into
//! typed command structs, responses build from typed results, and every
//! encoder has a decoding counterpart so the layouts are verified by
//! round-trip tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod packet;
pub mod request;
pub mod response;

pub use error::CodecError;
pub use packet::{
    RequestHeader, RequestPacket, ResponseHeader, HEADER_SIZE, MAGIC_REQUEST, MAGIC_RESPONSE,
    OP_SUBDOC_MULTI_LOOKUP, OP_SUBDOC_MULTI_MUTATION,
};
pub use request::{
    absolute_expiry, MultiLookupRequest, MultiMutationRequest, MultiSpec, SubdocRequest,
    RELATIVE_EXPIRY_LIMIT,
};
pub use response::{
    decode_lookup_payload, decode_mutation_payload, encode_lookup_payload,
    encode_mutation_failure, encode_mutation_payload, ResponsePacket,
};
