//! Single-path evaluator
//!
//! Applies one classified operation to one JSON fragment and reports the
//! outcome as a [`ResultInfo`]. The fragment is opaque text on the way in and
//! on the way out; structural semantics live entirely in this module.
//!
//! Status discipline:
//! - `SubdocDocNotJson` / `SubdocDocTooDeep` are document-level statuses; in
//!   lookup requests they abort the whole request, which is the caller's
//!   responsibility to enforce.
//! - Everything else describes only the spec being evaluated.
//!
//! Mutations never touch the input fragment; success returns the replacement
//! text in `new_fragment`.

use mockbase_core::types::PATH_FLAG_MKDIR_P;
use mockbase_core::Status;
use serde_json::{Map, Value};

use crate::operation::Operation;
use crate::path::{Path, PathComponent, PathError};

/// Maximum nesting depth of a document, matching the path component limit.
pub const MAX_DOC_DEPTH: usize = 32;

/// Outcome of evaluating one operation against one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInfo {
    /// Outcome status.
    pub status: Status,
    /// Matched value (JSON text), for match-returning operations on success.
    pub match_value: Option<String>,
    /// Replacement fragment text, for successful mutations only.
    pub new_fragment: Option<String>,
}

impl ResultInfo {
    fn fail(status: Status) -> Self {
        ResultInfo {
            status,
            match_value: None,
            new_fragment: None,
        }
    }

    fn found(match_value: Option<String>) -> Self {
        ResultInfo {
            status: Status::Success,
            match_value,
            new_fragment: None,
        }
    }

    fn mutated(new_fragment: String, match_value: Option<String>) -> Self {
        ResultInfo {
            status: Status::Success,
            match_value,
            new_fragment: Some(new_fragment),
        }
    }
}

/// Evaluate a lookup operation against a fragment.
///
/// Returns `SubdocInvalidCombo` when `op` is not lookup-capable; callers
/// normally reject such specs before evaluation.
pub fn evaluate_lookup(op: Operation, fragment: &str, path: &str) -> ResultInfo {
    if !op.is_lookup() {
        return ResultInfo::fail(Status::SubdocInvalidCombo);
    }
    let root = match parse_document(fragment) {
        Ok(v) => v,
        Err(status) => return ResultInfo::fail(status),
    };
    let path = match parse_path(path) {
        Ok(p) => p,
        Err(status) => return ResultInfo::fail(status),
    };
    let target = match resolve(&root, path.components()) {
        Ok(v) => v,
        Err(status) => return ResultInfo::fail(status),
    };
    match op {
        Operation::Get => ResultInfo::found(Some(target.to_string())),
        Operation::Exists => ResultInfo::found(None),
        Operation::GetCount => match target {
            Value::Object(map) => ResultInfo::found(Some(map.len().to_string())),
            Value::Array(arr) => ResultInfo::found(Some(arr.len().to_string())),
            _ => ResultInfo::fail(Status::SubdocPathMismatch),
        },
        _ => ResultInfo::fail(Status::SubdocInvalidCombo),
    }
}

/// Evaluate a mutation operation against a fragment.
///
/// On success the result carries the serialized replacement fragment and,
/// for match-returning operations (Counter), the match value. There are no
/// document-level fatal statuses on this surface; malformed documents are
/// caught when they are created.
pub fn evaluate_mutation(
    op: Operation,
    fragment: &str,
    path: &str,
    value: &str,
    flags: u8,
) -> ResultInfo {
    if !op.is_mutator() {
        return ResultInfo::fail(Status::SubdocInvalidCombo);
    }
    let mut root = match parse_document(fragment) {
        Ok(v) => v,
        Err(status) => return ResultInfo::fail(status),
    };
    let path = match parse_path(path) {
        Ok(p) => p,
        Err(status) => return ResultInfo::fail(status),
    };
    let mkdir_p = flags & PATH_FLAG_MKDIR_P != 0;
    match apply_mutation(op, &mut root, &path, value, mkdir_p) {
        Ok(match_value) => {
            if nesting_depth(&root) > MAX_DOC_DEPTH {
                return ResultInfo::fail(Status::SubdocValueTooDeep);
            }
            ResultInfo::mutated(root.to_string(), match_value)
        }
        Err(status) => ResultInfo::fail(status),
    }
}

// ============================================================================
// Document and path plumbing
// ============================================================================

fn parse_document(fragment: &str) -> Result<Value, Status> {
    let root: Value =
        serde_json::from_str(fragment).map_err(|_| Status::SubdocDocNotJson)?;
    if nesting_depth(&root) > MAX_DOC_DEPTH {
        return Err(Status::SubdocDocTooDeep);
    }
    Ok(root)
}

fn parse_path(path: &str) -> Result<Path, Status> {
    path.parse().map_err(|e| match e {
        PathError::TooManyComponents(_) => Status::SubdocPathTooDeep,
        PathError::Empty | PathError::Syntax(_) => Status::SubdocPathInvalid,
    })
}

/// Nesting depth: 0 for scalars, 1 + max child depth for containers.
fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => 0,
        Value::Array(arr) => 1 + arr.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(obj) => 1 + obj.values().map(nesting_depth).max().unwrap_or(0),
    }
}

/// Map a possibly negative index onto an array of `len` elements.
fn array_index(len: usize, index: i64) -> Option<usize> {
    if index >= 0 {
        let i = index as usize;
        (i < len).then_some(i)
    } else {
        let back = index.unsigned_abs() as usize;
        len.checked_sub(back)
    }
}

fn resolve<'a>(root: &'a Value, components: &[PathComponent]) -> Result<&'a Value, Status> {
    let mut current = root;
    for component in components {
        current = match component {
            PathComponent::Key(key) => match current {
                Value::Object(map) => map.get(key).ok_or(Status::SubdocPathNotFound)?,
                _ => return Err(Status::SubdocPathMismatch),
            },
            PathComponent::Index(index) => match current {
                Value::Array(arr) => {
                    let i = array_index(arr.len(), *index)
                        .ok_or(Status::SubdocPathNotFound)?;
                    &arr[i]
                }
                _ => return Err(Status::SubdocPathMismatch),
            },
        };
    }
    Ok(current)
}

/// Walk to an existing location, mutably. No creation.
fn resolve_existing_mut<'a>(
    root: &'a mut Value,
    components: &[PathComponent],
) -> Result<&'a mut Value, Status> {
    let mut current = root;
    for component in components {
        current = match component {
            PathComponent::Key(key) => match current {
                Value::Object(map) => {
                    map.get_mut(key).ok_or(Status::SubdocPathNotFound)?
                }
                _ => return Err(Status::SubdocPathMismatch),
            },
            PathComponent::Index(index) => match current {
                Value::Array(arr) => {
                    let i = array_index(arr.len(), *index)
                        .ok_or(Status::SubdocPathNotFound)?;
                    &mut arr[i]
                }
                _ => return Err(Status::SubdocPathMismatch),
            },
        };
    }
    Ok(current)
}

/// Walk to a location mutably, creating missing intermediate dictionaries
/// when `mkdir_p` is set. Array elements are never created implicitly.
fn resolve_parent_mut<'a>(
    root: &'a mut Value,
    components: &[PathComponent],
    mkdir_p: bool,
) -> Result<&'a mut Value, Status> {
    let mut current = root;
    for component in components {
        current = match component {
            PathComponent::Key(key) => match current {
                Value::Object(map) => {
                    if mkdir_p {
                        map.entry(key.clone())
                            .or_insert_with(|| Value::Object(Map::new()))
                    } else {
                        map.get_mut(key).ok_or(Status::SubdocPathNotFound)?
                    }
                }
                _ => return Err(Status::SubdocPathMismatch),
            },
            PathComponent::Index(index) => match current {
                Value::Array(arr) => {
                    let i = array_index(arr.len(), *index)
                        .ok_or(Status::SubdocPathNotFound)?;
                    &mut arr[i]
                }
                _ => return Err(Status::SubdocPathMismatch),
            },
        };
    }
    Ok(current)
}

fn parse_payload(raw: &str) -> Result<Value, Status> {
    serde_json::from_str(raw).map_err(|_| Status::SubdocValueCantInsert)
}

// ============================================================================
// Mutation application
// ============================================================================

fn apply_mutation(
    op: Operation,
    root: &mut Value,
    path: &Path,
    raw_value: &str,
    mkdir_p: bool,
) -> Result<Option<String>, Status> {
    match op {
        Operation::DictAdd | Operation::DictUpsert => {
            let key = match path.last() {
                PathComponent::Key(k) => k.clone(),
                PathComponent::Index(_) => return Err(Status::SubdocPathInvalid),
            };
            let value = parse_payload(raw_value)?;
            let parent = resolve_parent_mut(root, path.parent(), mkdir_p)?;
            let map = match parent {
                Value::Object(map) => map,
                _ => return Err(Status::SubdocPathMismatch),
            };
            if op == Operation::DictAdd && map.contains_key(&key) {
                return Err(Status::SubdocPathExists);
            }
            map.insert(key, value);
            Ok(None)
        }

        Operation::Replace => {
            let value = parse_payload(raw_value)?;
            let slot = resolve_existing_mut(root, path.components())?;
            *slot = value;
            Ok(None)
        }

        Operation::Remove => {
            let parent = resolve_existing_mut(root, path.parent())?;
            match (path.last(), parent) {
                (PathComponent::Key(key), Value::Object(map)) => {
                    map.remove(key).ok_or(Status::SubdocPathNotFound)?;
                }
                (PathComponent::Index(index), Value::Array(arr)) => {
                    let i = array_index(arr.len(), *index)
                        .ok_or(Status::SubdocPathNotFound)?;
                    arr.remove(i);
                }
                _ => return Err(Status::SubdocPathMismatch),
            }
            Ok(None)
        }

        Operation::ArrayPushLast | Operation::ArrayPushFirst | Operation::ArrayAddUnique => {
            let value = parse_payload(raw_value)?;
            let arr = resolve_array_mut(root, path, mkdir_p)?;
            if op == Operation::ArrayAddUnique && arr.contains(&value) {
                return Err(Status::SubdocPathExists);
            }
            if op == Operation::ArrayPushFirst {
                arr.insert(0, value);
            } else {
                arr.push(value);
            }
            Ok(None)
        }

        Operation::ArrayInsert => {
            let value = parse_payload(raw_value)?;
            let position = match path.last() {
                PathComponent::Index(n) if *n >= 0 => *n as usize,
                _ => return Err(Status::SubdocPathInvalid),
            };
            let parent = resolve_existing_mut(root, path.parent())?;
            let arr = match parent {
                Value::Array(arr) => arr,
                _ => return Err(Status::SubdocPathMismatch),
            };
            if position > arr.len() {
                return Err(Status::SubdocPathNotFound);
            }
            arr.insert(position, value);
            Ok(None)
        }

        Operation::Counter => apply_counter(root, path, raw_value, mkdir_p),

        // Lookups and unknown opcodes are rejected before evaluation.
        _ => Err(Status::SubdocInvalidCombo),
    }
}

/// The addressed location must be (or become) an array.
fn resolve_array_mut<'a>(
    root: &'a mut Value,
    path: &Path,
    mkdir_p: bool,
) -> Result<&'a mut Vec<Value>, Status> {
    let parent = resolve_parent_mut(root, path.parent(), mkdir_p)?;
    let target = match (path.last(), parent) {
        (PathComponent::Key(key), Value::Object(map)) => {
            if mkdir_p {
                map.entry(key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()))
            } else {
                map.get_mut(key).ok_or(Status::SubdocPathNotFound)?
            }
        }
        (PathComponent::Index(index), Value::Array(arr)) => {
            let i = array_index(arr.len(), *index).ok_or(Status::SubdocPathNotFound)?;
            &mut arr[i]
        }
        _ => return Err(Status::SubdocPathMismatch),
    };
    match target {
        Value::Array(arr) => Ok(arr),
        _ => Err(Status::SubdocPathMismatch),
    }
}

fn apply_counter(
    root: &mut Value,
    path: &Path,
    raw_delta: &str,
    mkdir_p: bool,
) -> Result<Option<String>, Status> {
    let delta: i64 = raw_delta
        .trim()
        .parse()
        .map_err(|_| Status::SubdocDeltaOutOfRange)?;
    if delta == 0 {
        return Err(Status::SubdocDeltaOutOfRange);
    }

    match path.last() {
        PathComponent::Key(key) => {
            let parent = resolve_parent_mut(root, path.parent(), mkdir_p)?;
            let map = match parent {
                Value::Object(map) => map,
                _ => return Err(Status::SubdocPathMismatch),
            };
            let next = match map.get(key) {
                // An absent counter is created holding the delta.
                None => delta,
                Some(existing) => {
                    let current =
                        existing.as_i64().ok_or(Status::SubdocPathMismatch)?;
                    current
                        .checked_add(delta)
                        .ok_or(Status::SubdocNumOutOfRange)?
                }
            };
            map.insert(key.clone(), Value::from(next));
            Ok(Some(next.to_string()))
        }
        PathComponent::Index(_) => {
            let slot = resolve_existing_mut(root, path.components())?;
            let current = slot.as_i64().ok_or(Status::SubdocPathMismatch)?;
            let next = current
                .checked_add(delta)
                .ok_or(Status::SubdocNumOutOfRange)?;
            *slot = Value::from(next);
            Ok(Some(next.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(op: Operation, doc: &str, path: &str) -> ResultInfo {
        evaluate_lookup(op, doc, path)
    }

    fn mutate(op: Operation, doc: &str, path: &str, value: &str) -> ResultInfo {
        evaluate_mutation(op, doc, path, value, 0)
    }

    fn mutate_mkdir(op: Operation, doc: &str, path: &str, value: &str) -> ResultInfo {
        evaluate_mutation(op, doc, path, value, PATH_FLAG_MKDIR_P)
    }

    // ------------------------------------------------------------------ lookup

    #[test]
    fn get_returns_json_text() {
        let r = lookup(Operation::Get, r#"{"y":5}"#, "y");
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.match_value.as_deref(), Some("5"));
        assert!(r.new_fragment.is_none());
    }

    #[test]
    fn get_nested_and_indexed() {
        let doc = r#"{"a":{"b":[10,20,30]}}"#;
        assert_eq!(
            lookup(Operation::Get, doc, "a.b[1]").match_value.as_deref(),
            Some("20")
        );
        assert_eq!(
            lookup(Operation::Get, doc, "a.b[-1]").match_value.as_deref(),
            Some("30")
        );
    }

    #[test]
    fn get_missing_path() {
        let r = lookup(Operation::Get, r#"{"y":5}"#, "x");
        assert_eq!(r.status, Status::SubdocPathNotFound);
        assert!(r.match_value.is_none());
    }

    #[test]
    fn get_mismatched_container() {
        // Key component into an array
        let r = lookup(Operation::Get, r#"{"a":[1]}"#, "a.b");
        assert_eq!(r.status, Status::SubdocPathMismatch);
        // Index component into an object
        let r = lookup(Operation::Get, r#"{"a":{"b":1}}"#, "a[0]");
        assert_eq!(r.status, Status::SubdocPathMismatch);
    }

    #[test]
    fn exists_has_no_match() {
        let r = lookup(Operation::Exists, r#"{"y":5}"#, "y");
        assert_eq!(r.status, Status::Success);
        assert!(r.match_value.is_none());
    }

    #[test]
    fn get_count_counts_containers() {
        let doc = r#"{"o":{"a":1,"b":2},"l":[1,2,3],"s":7}"#;
        assert_eq!(
            lookup(Operation::GetCount, doc, "o").match_value.as_deref(),
            Some("2")
        );
        assert_eq!(
            lookup(Operation::GetCount, doc, "l").match_value.as_deref(),
            Some("3")
        );
        assert_eq!(
            lookup(Operation::GetCount, doc, "s").status,
            Status::SubdocPathMismatch
        );
    }

    #[test]
    fn lookup_on_invalid_document_is_doc_fatal() {
        let r = lookup(Operation::Get, "not json at all", "a");
        assert_eq!(r.status, Status::SubdocDocNotJson);
    }

    #[test]
    fn lookup_on_too_deep_document_is_doc_fatal() {
        let mut doc = String::new();
        for _ in 0..(MAX_DOC_DEPTH + 1) {
            doc.push_str(r#"{"a":"#);
        }
        doc.push('1');
        for _ in 0..(MAX_DOC_DEPTH + 1) {
            doc.push('}');
        }
        let r = lookup(Operation::Get, &doc, "a");
        assert_eq!(r.status, Status::SubdocDocTooDeep);
    }

    #[test]
    fn lookup_with_invalid_path() {
        let r = lookup(Operation::Get, "{}", "a..b");
        assert_eq!(r.status, Status::SubdocPathInvalid);
        let r = lookup(Operation::Get, "{}", "");
        assert_eq!(r.status, Status::SubdocPathInvalid);
    }

    #[test]
    fn lookup_rejects_mutators() {
        let r = lookup(Operation::DictUpsert, "{}", "a");
        assert_eq!(r.status, Status::SubdocInvalidCombo);
    }

    // ---------------------------------------------------------------- mutation

    #[test]
    fn dict_upsert_inserts_into_existing_parent() {
        let r = mutate(Operation::DictUpsert, r#"{"a":{}}"#, "a.b", "1");
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"a":{"b":1}}"#));
        assert!(r.match_value.is_none());
    }

    #[test]
    fn dict_upsert_overwrites() {
        let r = mutate(Operation::DictUpsert, r#"{"a":1}"#, "a", "2");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"a":2}"#));
    }

    #[test]
    fn dict_add_rejects_existing_key() {
        let r = mutate(Operation::DictAdd, r#"{"a":1}"#, "a", "2");
        assert_eq!(r.status, Status::SubdocPathExists);
        assert!(r.new_fragment.is_none());
    }

    #[test]
    fn dict_add_requires_parent_without_mkdir() {
        let r = mutate(Operation::DictAdd, "{}", "a.b", "1");
        assert_eq!(r.status, Status::SubdocPathNotFound);
    }

    #[test]
    fn dict_add_mkdir_creates_intermediates() {
        let r = mutate_mkdir(Operation::DictAdd, "{}", "a.b.c", "1");
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"a":{"b":{"c":1}}}"#));
    }

    #[test]
    fn dict_ops_reject_index_final_component() {
        let r = mutate(Operation::DictUpsert, r#"{"a":[1]}"#, "a[0]", "2");
        assert_eq!(r.status, Status::SubdocPathInvalid);
    }

    #[test]
    fn replace_requires_existing_path() {
        let r = mutate(Operation::Replace, r#"{"a":1}"#, "b", "2");
        assert_eq!(r.status, Status::SubdocPathNotFound);
        let r = mutate(Operation::Replace, r#"{"a":1}"#, "a", "[1,2]");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"a":[1,2]}"#));
    }

    #[test]
    fn remove_key_and_element() {
        let r = mutate(Operation::Remove, r#"{"a":1,"b":2}"#, "a", "");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"b":2}"#));
        let r = mutate(Operation::Remove, r#"{"l":[1,2,3]}"#, "l[-1]", "");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1,2]}"#));
        let r = mutate(Operation::Remove, r#"{"a":1}"#, "b", "");
        assert_eq!(r.status, Status::SubdocPathNotFound);
    }

    #[test]
    fn array_push_last_and_first() {
        let r = mutate(Operation::ArrayPushLast, r#"{"l":[1]}"#, "l", "2");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1,2]}"#));
        let r = mutate(Operation::ArrayPushFirst, r#"{"l":[1]}"#, "l", "0");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[0,1]}"#));
    }

    #[test]
    fn array_push_creates_array_with_mkdir() {
        let r = mutate_mkdir(Operation::ArrayPushLast, "{}", "l", "1");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1]}"#));
        let r = mutate(Operation::ArrayPushLast, "{}", "l", "1");
        assert_eq!(r.status, Status::SubdocPathNotFound);
    }

    #[test]
    fn array_push_rejects_non_array_target() {
        let r = mutate(Operation::ArrayPushLast, r#"{"l":5}"#, "l", "1");
        assert_eq!(r.status, Status::SubdocPathMismatch);
    }

    #[test]
    fn array_add_unique_checks_membership() {
        let r = mutate(Operation::ArrayAddUnique, r#"{"l":[1,2]}"#, "l", "2");
        assert_eq!(r.status, Status::SubdocPathExists);
        let r = mutate(Operation::ArrayAddUnique, r#"{"l":[1,2]}"#, "l", "3");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1,2,3]}"#));
    }

    #[test]
    fn array_insert_at_position() {
        let r = mutate(Operation::ArrayInsert, r#"{"l":[1,3]}"#, "l[1]", "2");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1,2,3]}"#));
        // Position == len appends
        let r = mutate(Operation::ArrayInsert, r#"{"l":[1]}"#, "l[1]", "2");
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[1,2]}"#));
        // Past the end
        let r = mutate(Operation::ArrayInsert, r#"{"l":[1]}"#, "l[5]", "2");
        assert_eq!(r.status, Status::SubdocPathNotFound);
        // Final component must be a non-negative index
        let r = mutate(Operation::ArrayInsert, r#"{"l":[1]}"#, "l", "2");
        assert_eq!(r.status, Status::SubdocPathInvalid);
        let r = mutate(Operation::ArrayInsert, r#"{"l":[1]}"#, "l[-1]", "2");
        assert_eq!(r.status, Status::SubdocPathInvalid);
    }

    #[test]
    fn counter_adds_and_creates() {
        let r = mutate(Operation::Counter, r#"{"n":5}"#, "n", "3");
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.match_value.as_deref(), Some("8"));
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"n":8}"#));

        let r = mutate(Operation::Counter, "{}", "n", "-2");
        assert_eq!(r.match_value.as_deref(), Some("-2"));
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"n":-2}"#));
    }

    #[test]
    fn counter_rejects_bad_deltas() {
        assert_eq!(
            mutate(Operation::Counter, r#"{"n":1}"#, "n", "0").status,
            Status::SubdocDeltaOutOfRange
        );
        assert_eq!(
            mutate(Operation::Counter, r#"{"n":1}"#, "n", "1.5").status,
            Status::SubdocDeltaOutOfRange
        );
        assert_eq!(
            mutate(Operation::Counter, r#"{"n":1}"#, "n", "\"x\"").status,
            Status::SubdocDeltaOutOfRange
        );
    }

    #[test]
    fn counter_rejects_non_integer_target() {
        assert_eq!(
            mutate(Operation::Counter, r#"{"n":"s"}"#, "n", "1").status,
            Status::SubdocPathMismatch
        );
    }

    #[test]
    fn counter_overflow() {
        let doc = format!(r#"{{"n":{}}}"#, i64::MAX);
        assert_eq!(
            mutate(Operation::Counter, &doc, "n", "1").status,
            Status::SubdocNumOutOfRange
        );
    }

    #[test]
    fn counter_on_array_element() {
        let r = mutate(Operation::Counter, r#"{"l":[10]}"#, "l[0]", "5");
        assert_eq!(r.match_value.as_deref(), Some("15"));
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"l":[15]}"#));
    }

    #[test]
    fn invalid_payload_cannot_insert() {
        let r = mutate(Operation::DictUpsert, "{}", "a", "{not json");
        assert_eq!(r.status, Status::SubdocValueCantInsert);
    }

    #[test]
    fn mutation_that_exceeds_depth_is_rejected() {
        let mut value = String::new();
        for _ in 0..MAX_DOC_DEPTH {
            value.push_str(r#"{"a":"#);
        }
        value.push('1');
        for _ in 0..MAX_DOC_DEPTH {
            value.push('}');
        }
        let r = mutate(Operation::DictUpsert, "{}", "deep", &value);
        assert_eq!(r.status, Status::SubdocValueTooDeep);
    }

    #[test]
    fn mutation_rejects_lookups() {
        let r = mutate(Operation::Get, "{}", "a", "1");
        assert_eq!(r.status, Status::SubdocInvalidCombo);
    }

    #[test]
    fn mutation_never_alters_input_fragment() {
        let doc = r#"{"a":1}"#;
        let r = mutate(Operation::DictUpsert, doc, "b", "2");
        assert_eq!(r.status, Status::Success);
        // The input string is untouched; the change only exists in new_fragment.
        assert_eq!(doc, r#"{"a":1}"#);
        assert_eq!(r.new_fragment.as_deref(), Some(r#"{"a":1,"b":2}"#));
    }
}
