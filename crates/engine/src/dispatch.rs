//! One-packet command dispatch
//!
//! The embedded-mode seam: takes one framed request, routes it across the
//! subdoc opcode family, and returns the framed response. Codec violations
//! (truncated or malformed packets) are errors — fatal to the caller's
//! connection — while every protocol-level problem comes back as a response
//! with the appropriate status.

use mockbase_core::Status;
use mockbase_storage::Bucket;
use mockbase_subdoc::Operation;
use mockbase_wire::{
    CodecError, MultiLookupRequest, MultiMutationRequest, RequestPacket, ResponsePacket,
    SubdocRequest, OP_SUBDOC_MULTI_LOOKUP, OP_SUBDOC_MULTI_MUTATION,
};

use crate::multi::{execute_multi_lookup, execute_multi_mutation};
use crate::single::execute_subdoc;

/// Decode one request packet, execute it against `bucket`, and encode the
/// response. `retry_limit` bounds the multi-mutation create-race loop.
pub fn dispatch(buf: &[u8], bucket: &Bucket, retry_limit: usize) -> Result<Vec<u8>, CodecError> {
    let packet = RequestPacket::decode(buf)?;
    let opcode = packet.header.opcode;
    let opaque = packet.header.opaque;
    tracing::trace!(
        target: "mockbase::dispatch",
        opcode = format_args!("0x{:02x}", opcode),
        key = %packet.key,
        "request"
    );

    let response = match opcode {
        OP_SUBDOC_MULTI_LOOKUP => {
            let request = MultiLookupRequest::decode(&packet)?;
            match bucket.cache_for(&request.key) {
                Ok(store) => execute_multi_lookup(&request, store.as_ref()),
                Err(status) => ResponsePacket::status_only(opcode, opaque, status),
            }
        }
        OP_SUBDOC_MULTI_MUTATION => {
            let request = MultiMutationRequest::decode(&packet)?;
            match bucket.cache_for(&request.key) {
                Ok(store) => execute_multi_mutation(&request, store.as_ref(), retry_limit),
                Err(status) => ResponsePacket::status_only(opcode, opaque, status),
            }
        }
        other => match Operation::classify(other) {
            Operation::Unknown(_) => {
                ResponsePacket::status_only(opcode, opaque, Status::UnknownCommand)
            }
            _ => {
                let request = SubdocRequest::decode(&packet)?;
                match bucket.cache_for(&request.key) {
                    Ok(store) => execute_subdoc(&request, store.as_ref()),
                    Err(status) => ResponsePacket::status_only(opcode, opaque, status),
                }
            }
        },
    };
    Ok(response.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbase_core::{Item, KeySpec};
    use mockbase_wire::MultiSpec;

    fn bucket_with(key: &str, body: &str) -> (Bucket, KeySpec) {
        let bucket = Bucket::new("default", 16);
        let spec = bucket.key_spec(key);
        bucket
            .cache_for(&spec)
            .unwrap()
            .add(Item::new(spec.clone(), 0, 0, body.as_bytes().to_vec(), None, 0));
        (bucket, spec)
    }

    #[test]
    fn routes_multi_lookup() {
        let (bucket, spec) = bucket_with("doc", r#"{"a":1}"#);
        let request = MultiLookupRequest {
            key: spec,
            opaque: 3,
            doc_flags: 0,
            specs: [MultiSpec {
                op: Operation::Get,
                flags: 0,
                path: "a".to_string(),
                value: String::new(),
            }]
            .into_iter()
            .collect(),
        };
        let bytes = dispatch(&request.encode(), &bucket, 8).unwrap();
        let response = ResponsePacket::decode(&bytes).unwrap();
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.opaque, 3);
    }

    #[test]
    fn misrouted_vbucket_is_not_my_vbucket() {
        let (bucket, spec) = bucket_with("doc", r#"{"a":1}"#);
        let wrong = KeySpec::new("doc", (spec.vbucket() + 1) % 16);
        let request = MultiLookupRequest {
            key: wrong,
            opaque: 0,
            doc_flags: 0,
            specs: [MultiSpec {
                op: Operation::Get,
                flags: 0,
                path: "a".to_string(),
                value: String::new(),
            }]
            .into_iter()
            .collect(),
        };
        let bytes = dispatch(&request.encode(), &bucket, 8).unwrap();
        let response = ResponsePacket::decode(&bytes).unwrap();
        assert_eq!(response.status, Status::NotMyVbucket);
    }

    #[test]
    fn unknown_opcode_gets_a_response_not_an_error() {
        let (bucket, spec) = bucket_with("doc", "{}");
        // Forge a packet with an opcode outside the subdoc family.
        let request = SubdocRequest {
            op: Operation::Unknown(0x1f),
            key: spec,
            cas: 0,
            opaque: 0,
            path_flags: 0,
            expiry: None,
            path: String::new(),
            value: String::new(),
        };
        let bytes = dispatch(&request.encode(), &bucket, 8).unwrap();
        let response = ResponsePacket::decode(&bytes).unwrap();
        assert_eq!(response.status, Status::UnknownCommand);
    }

    #[test]
    fn truncated_packet_is_a_codec_error() {
        let bucket = Bucket::new("default", 16);
        assert!(matches!(
            dispatch(&[0x80, 0x00], &bucket, 8).unwrap_err(),
            CodecError::Truncated { .. }
        ));
    }

    #[test]
    fn routes_single_path_command() {
        let (bucket, spec) = bucket_with("doc", r#"{"n":1}"#);
        let request = SubdocRequest {
            op: Operation::Counter,
            key: spec,
            cas: 0,
            opaque: 11,
            path_flags: 0,
            expiry: None,
            path: "n".to_string(),
            value: "1".to_string(),
        };
        let bytes = dispatch(&request.encode(), &bucket, 8).unwrap();
        let response = ResponsePacket::decode(&bytes).unwrap();
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.value, b"2");
        assert_eq!(response.opaque, 11);
    }
}
