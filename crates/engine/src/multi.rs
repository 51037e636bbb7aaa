//! Multi-path executor
//!
//! Applies an ordered list of path-level operations to one document and
//! commits the result under CAS. The two request modes have deliberately
//! different failure rules, so they are separate functions rather than one
//! parameterized loop:
//!
//! - **Lookup**: per-spec failures are data — recorded and evaluation
//!   continues. Only the two document-level statuses (not-JSON, too-deep)
//!   and a mutator-in-lookup combination abort the whole request. Lookups
//!   never write.
//! - **Mutation**: all-or-nothing. The first failing spec aborts the whole
//!   request with a single (index, status) payload and nothing is committed.
//!
//! ## Commit sequence (mutation)
//!
//! 1. Fetch the item, or synthesize one when the key is absent and the
//!    request carries the create flag
//! 2. Run every spec against working copies of the body and xattr fragments
//! 3. Build a new item from the final fragments (never mutate in place)
//! 4. Submit via `add` (create) or `replace` (update), both CAS-checked
//! 5. A create that loses the race re-runs from step 1 with fresh state,
//!    up to the configured retry bound

use mockbase_core::{BucketCache, Item, SpecResult, Status};
use mockbase_subdoc::{evaluate_lookup, evaluate_mutation, Operation};
use mockbase_wire::{
    encode_lookup_payload, encode_mutation_failure, encode_mutation_payload, MultiLookupRequest,
    MultiMutationRequest, ResponsePacket, OP_SUBDOC_MULTI_LOOKUP, OP_SUBDOC_MULTI_MUTATION,
};

/// Empty xattr fragment used when an item stores no xattrs.
const EMPTY_XATTRS: &str = "{}";

/// Working state carried across one pass of the mutation spec loop.
///
/// Owned exclusively by the executing call; dropped or rebuilt on retry,
/// never shared and never retained after the request completes.
struct ExecState {
    body: String,
    xattr: String,
    has_xattr_spec: bool,
    results: Vec<SpecResult>,
}

/// A mutation spec failure that aborts the whole request.
struct SpecAbort {
    index: usize,
    status: Status,
}

/// Execute a multi-lookup request. Never mutates or commits the item.
pub fn execute_multi_lookup<C>(request: &MultiLookupRequest, cache: &C) -> ResponsePacket
where
    C: BucketCache + ?Sized,
{
    let opcode = OP_SUBDOC_MULTI_LOOKUP;

    let existing = match cache.get(&request.key) {
        Some(item) => item,
        None => return ResponsePacket::status_only(opcode, request.opaque, Status::KeyNotFound),
    };
    let body = String::from_utf8_lossy(existing.body()).into_owned();

    let mut results = Vec::with_capacity(request.specs.len());
    for (index, spec) in request.specs.iter().enumerate() {
        let op = spec.op;
        if let Operation::Unknown(opcode) = op {
            tracing::debug!(
                target: "mockbase::engine",
                index,
                opcode,
                "unknown operation in lookup request"
            );
            results.push(SpecResult::status_only(index, Status::UnknownCommand));
            continue;
        }
        if !op.is_lookup() {
            // A mutator in lookup position invalidates the whole request.
            return ResponsePacket::status_only(opcode, request.opaque, Status::SubdocInvalidCombo);
        }

        let rsi = evaluate_lookup(op, &body, &spec.path);
        if rsi.status.is_document_fatal() {
            return ResponsePacket::status_only(opcode, request.opaque, rsi.status);
        }
        if rsi.status.is_success() && op.returns_match() {
            results.push(SpecResult {
                index,
                status: Status::Success,
                value: rsi.match_value,
            });
        } else {
            results.push(SpecResult::status_only(index, rsi.status));
        }
    }

    let any_failed = results.iter().any(|r| !r.status.is_success());
    let top_level = if any_failed {
        Status::SubdocMultiFailure
    } else {
        Status::Success
    };
    ResponsePacket::with_value(
        opcode,
        request.opaque,
        top_level,
        existing.cas(),
        encode_lookup_payload(&results),
    )
}

/// Execute a multi-mutation request: all specs, then one CAS-checked commit.
///
/// `retry_limit` bounds the create-race loop; when a concurrent creator
/// keeps winning for that many attempts the request fails with
/// `TemporaryFailure` instead of racing forever.
pub fn execute_multi_mutation<C>(
    request: &MultiMutationRequest,
    cache: &C,
    retry_limit: usize,
) -> ResponsePacket
where
    C: BucketCache + ?Sized,
{
    let opcode = OP_SUBDOC_MULTI_MUTATION;

    for attempt in 0..retry_limit.max(1) {
        // Each attempt re-reads the cache, so a retry after a lost create
        // race evaluates against the racing writer's document rather than
        // the stale synthesized one.
        let (existing, need_create) = match cache.get(&request.key) {
            Some(item) => (item, false),
            None => {
                if !request.has_mkdoc() {
                    return ResponsePacket::status_only(opcode, request.opaque, Status::KeyNotFound);
                }
                let root = match request.root_body() {
                    Some(root) => root,
                    None => {
                        return ResponsePacket::status_only(
                            opcode,
                            request.opaque,
                            Status::KeyNotFound,
                        )
                    }
                };
                let item = Item::new(
                    request.key.clone(),
                    0,
                    0,
                    root.as_bytes().to_vec(),
                    Some(EMPTY_XATTRS.as_bytes().to_vec()),
                    0,
                );
                (item, true)
            }
        };

        let state = match run_mutation_specs(request, &existing) {
            Ok(state) => state,
            Err(abort) => {
                let top_level = if abort.status == Status::SubdocInvalidCombo {
                    Status::SubdocInvalidCombo
                } else {
                    Status::SubdocMultiFailure
                };
                return ResponsePacket::with_value(
                    opcode,
                    request.opaque,
                    top_level,
                    0,
                    encode_mutation_failure(abort.index, abort.status),
                );
            }
        };

        // xattr bytes for the new item, by priority: fragments touched this
        // pass, then "nothing stored" for a brand-new document, then the
        // original item's xattrs unchanged.
        let new_xattr = if state.has_xattr_spec {
            Some(state.xattr.into_bytes())
        } else if need_create {
            None
        } else {
            existing.xattr().map(|x| x.to_vec())
        };

        let new_item = Item::new(
            request.key.clone(),
            existing.flags(),
            request.new_expiry(existing.expiry()),
            state.body.into_bytes(),
            new_xattr,
            request.cas,
        );

        let committed = if need_create {
            let committed = cache.add(new_item);
            if committed.status == Status::KeyExists {
                // A concurrent create won the race. Discard this pass and
                // re-run against the now-existing document.
                tracing::debug!(
                    target: "mockbase::engine",
                    key = %request.key,
                    attempt,
                    "create race lost, retrying"
                );
                continue;
            }
            committed
        } else {
            cache.replace(new_item)
        };

        return ResponsePacket::with_value(
            opcode,
            request.opaque,
            committed.status,
            committed.cas,
            encode_mutation_payload(&state.results),
        );
    }

    tracing::warn!(
        target: "mockbase::engine",
        key = %request.key,
        retry_limit,
        "create retries exhausted under contention"
    );
    ResponsePacket::status_only(opcode, request.opaque, Status::TemporaryFailure)
}

/// Run every mutation spec in order against working fragment copies.
///
/// Later specs observe the fragment state left by earlier specs in the same
/// namespace. The first failure aborts the pass; nothing escapes except the
/// returned state.
fn run_mutation_specs(
    request: &MultiMutationRequest,
    existing: &Item,
) -> Result<ExecState, SpecAbort> {
    let mut state = ExecState {
        body: String::from_utf8_lossy(existing.body()).into_owned(),
        xattr: existing
            .xattr()
            .map(|x| String::from_utf8_lossy(x).into_owned())
            .unwrap_or_else(|| EMPTY_XATTRS.to_string()),
        has_xattr_spec: false,
        results: Vec::new(),
    };

    for (index, spec) in request.specs.iter().enumerate() {
        let op = spec.op;
        if matches!(op, Operation::Unknown(_)) {
            return Err(SpecAbort {
                index,
                status: Status::UnknownCommand,
            });
        }
        if !op.is_mutator() {
            return Err(SpecAbort {
                index,
                status: Status::SubdocInvalidCombo,
            });
        }

        let fragment = if spec.is_xattr() {
            &state.xattr
        } else {
            &state.body
        };
        let rsi = evaluate_mutation(op, fragment, &spec.path, &spec.value, spec.flags);
        if !rsi.status.is_success() {
            return Err(SpecAbort {
                index,
                status: rsi.status,
            });
        }
        match rsi.new_fragment {
            Some(new_fragment) if spec.is_xattr() => {
                state.xattr = new_fragment;
                state.has_xattr_spec = true;
            }
            Some(new_fragment) => state.body = new_fragment,
            None => {}
        }
        if op.returns_match() {
            state.results.push(SpecResult {
                index,
                status: Status::Success,
                value: rsi.match_value,
            });
        }
    }

    Ok(state)
}
