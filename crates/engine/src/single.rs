//! Single-path executor
//!
//! One operation, one path, one document. Reuses the multi executor's
//! evaluator and cache contract but with the simpler wire shape: the match
//! value (when any) is the whole response payload, and there is no document
//! creation on this surface — a missing key is always `KeyNotFound`.

use mockbase_core::types::PATH_FLAG_XATTR;
use mockbase_core::{BucketCache, Item, Status};
use mockbase_subdoc::{evaluate_lookup, evaluate_mutation, Operation};
use mockbase_wire::{absolute_expiry, ResponsePacket, SubdocRequest};

/// Execute a single-path subdoc command.
pub fn execute_subdoc<C>(request: &SubdocRequest, cache: &C) -> ResponsePacket
where
    C: BucketCache + ?Sized,
{
    let opcode = request.op.opcode();

    if matches!(request.op, Operation::Unknown(_)) {
        return ResponsePacket::status_only(opcode, request.opaque, Status::UnknownCommand);
    }

    let existing = match cache.get(&request.key) {
        Some(item) => item,
        None => return ResponsePacket::status_only(opcode, request.opaque, Status::KeyNotFound),
    };

    let is_xattr = request.path_flags & PATH_FLAG_XATTR != 0;
    let body = String::from_utf8_lossy(existing.body()).into_owned();
    let xattr = existing
        .xattr()
        .map(|x| String::from_utf8_lossy(x).into_owned())
        .unwrap_or_else(|| "{}".to_string());
    let fragment = if is_xattr { &xattr } else { &body };

    if request.op.is_lookup() {
        let rsi = evaluate_lookup(request.op, fragment, &request.path);
        if !rsi.status.is_success() {
            return ResponsePacket::status_only(opcode, request.opaque, rsi.status);
        }
        let payload = rsi.match_value.unwrap_or_default().into_bytes();
        return ResponsePacket::with_value(
            opcode,
            request.opaque,
            Status::Success,
            existing.cas(),
            payload,
        );
    }

    let rsi = evaluate_mutation(
        request.op,
        fragment,
        &request.path,
        &request.value,
        request.path_flags,
    );
    if !rsi.status.is_success() {
        return ResponsePacket::status_only(opcode, request.opaque, rsi.status);
    }
    // Success always carries a replacement; fall back to "no change".
    let new_fragment = rsi.new_fragment.unwrap_or_else(|| fragment.clone()).into_bytes();

    let (new_body, new_xattr) = if is_xattr {
        (existing.body().to_vec(), Some(new_fragment))
    } else {
        (new_fragment, existing.xattr().map(|x| x.to_vec()))
    };
    let expiry = match request.expiry {
        None => existing.expiry(),
        Some(raw) => absolute_expiry(raw),
    };
    let new_item = Item::new(
        request.key.clone(),
        existing.flags(),
        expiry,
        new_body,
        new_xattr,
        request.cas,
    );
    let committed = cache.replace(new_item);
    if !committed.is_success() {
        return ResponsePacket::status_only(opcode, request.opaque, committed.status);
    }

    let payload = if request.op.returns_match() {
        rsi.match_value.unwrap_or_default().into_bytes()
    } else {
        Vec::new()
    };
    ResponsePacket::with_value(opcode, request.opaque, Status::Success, committed.cas, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbase_core::KeySpec;
    use mockbase_storage::VBucketStore;

    fn key() -> KeySpec {
        KeySpec::new("doc", 0)
    }

    fn store_with(body: &str) -> VBucketStore {
        let store = VBucketStore::new();
        store.add(Item::new(key(), 0, 0, body.as_bytes().to_vec(), None, 0));
        store
    }

    fn request(op: Operation, path: &str, value: &str) -> SubdocRequest {
        SubdocRequest {
            op,
            key: key(),
            cas: 0,
            opaque: 5,
            path_flags: 0,
            expiry: None,
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn get_returns_the_match_as_payload() {
        let store = store_with(r#"{"a":{"b":2}}"#);
        let response = execute_subdoc(&request(Operation::Get, "a.b", ""), &store);
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.value, b"2");
        assert_ne!(response.cas, 0);
    }

    #[test]
    fn missing_key_is_key_not_found() {
        let store = VBucketStore::new();
        let response = execute_subdoc(&request(Operation::Get, "a", ""), &store);
        assert_eq!(response.status, Status::KeyNotFound);
    }

    #[test]
    fn lookup_failure_is_the_response_status() {
        let store = store_with(r#"{"a":1}"#);
        let response = execute_subdoc(&request(Operation::Get, "b", ""), &store);
        assert_eq!(response.status, Status::SubdocPathNotFound);
        assert!(response.value.is_empty());
    }

    #[test]
    fn mutation_commits_via_replace() {
        let store = store_with(r#"{"a":1}"#);
        let before = store.get(&key()).unwrap().cas();
        let response = execute_subdoc(&request(Operation::DictUpsert, "b", "2"), &store);
        assert_eq!(response.status, Status::Success);
        assert_ne!(response.cas, before);
        assert_eq!(store.get(&key()).unwrap().body(), br#"{"a":1,"b":2}"#);
    }

    #[test]
    fn counter_returns_the_new_value() {
        let store = store_with(r#"{"n":41}"#);
        let response = execute_subdoc(&request(Operation::Counter, "n", "1"), &store);
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.value, b"42");
    }

    #[test]
    fn mutation_failure_commits_nothing() {
        let store = store_with(r#"{"a":1}"#);
        let before = store.get(&key()).unwrap();
        let response = execute_subdoc(&request(Operation::Replace, "missing", "1"), &store);
        assert_eq!(response.status, Status::SubdocPathNotFound);
        let after = store.get(&key()).unwrap();
        assert_eq!(after.cas(), before.cas());
    }

    #[test]
    fn stale_cas_fails_the_commit() {
        let store = store_with(r#"{"a":1}"#);
        let mut req = request(Operation::DictUpsert, "a", "2");
        req.cas = 999_999;
        let response = execute_subdoc(&req, &store);
        assert_eq!(response.status, Status::KeyExists);
    }

    #[test]
    fn xattr_flag_addresses_the_metadata_namespace() {
        let store = store_with(r#"{"a":1}"#);
        let mut req = request(Operation::DictUpsert, "meta", "true");
        req.path_flags = PATH_FLAG_XATTR;
        let response = execute_subdoc(&req, &store);
        assert_eq!(response.status, Status::Success);
        let item = store.get(&key()).unwrap();
        assert_eq!(item.body(), br#"{"a":1}"#);
        assert_eq!(item.xattr(), Some(&br#"{"meta":true}"#[..]));
    }

    #[test]
    fn unknown_opcode_is_unknown_command() {
        let store = store_with("{}");
        let response = execute_subdoc(&request(Operation::Unknown(0x33), "a", ""), &store);
        assert_eq!(response.status, Status::UnknownCommand);
    }
}
