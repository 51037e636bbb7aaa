//! Shared small types: per-spec results, mutation outcomes, flag bits

use crate::status::Status;

/// Per-spec flag: create intermediate containers along the path.
pub const PATH_FLAG_MKDIR_P: u8 = 0x01;
/// Per-spec flag: the spec targets the xattr namespace instead of the body.
pub const PATH_FLAG_XATTR: u8 = 0x04;

/// Document flag: create the document when the key does not exist.
pub const DOC_FLAG_MKDOC: u8 = 0x01;
/// Document flag: the request insists on creating the document.
pub const DOC_FLAG_ADD: u8 = 0x02;
/// Document flag: operate on a logically deleted document.
pub const DOC_FLAG_ACCESS_DELETED: u8 = 0x04;

/// Outcome of one spec within a multi request.
///
/// `index` is the 0-based position of the originating spec. Mutation results
/// are sparse (only match-returning specs produce one), so the index is
/// carried explicitly rather than implied by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResult {
    /// Position of the originating spec in the request.
    pub index: usize,
    /// Per-spec outcome code.
    pub status: Status,
    /// Matched value, present only on success of a match-returning operation.
    pub value: Option<String>,
}

impl SpecResult {
    /// A failed (or value-less successful) spec outcome.
    pub fn status_only(index: usize, status: Status) -> Self {
        SpecResult {
            index,
            status,
            value: None,
        }
    }

    /// A successful spec outcome carrying a match value.
    pub fn matched(index: usize, value: impl Into<String>) -> Self {
        SpecResult {
            index,
            status: Status::Success,
            value: Some(value.into()),
        }
    }
}

/// Outcome of a cache mutation (`add`, `replace`, `delete`).
///
/// `cas` is the newly assigned token and is only meaningful when `status`
/// is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Status of the mutation.
    pub status: Status,
    /// CAS assigned by the cache on success, 0 otherwise.
    pub cas: u64,
}

impl MutationResult {
    /// Successful mutation with the assigned CAS.
    pub fn success(cas: u64) -> Self {
        MutationResult {
            status: Status::Success,
            cas,
        }
    }

    /// Failed mutation.
    pub fn failed(status: Status) -> Self {
        MutationResult { status, cas: 0 }
    }

    /// Whether the mutation succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_result_constructors() {
        let ok = SpecResult::matched(3, "5");
        assert_eq!(ok.index, 3);
        assert_eq!(ok.status, Status::Success);
        assert_eq!(ok.value.as_deref(), Some("5"));

        let err = SpecResult::status_only(0, Status::SubdocPathNotFound);
        assert_eq!(err.status, Status::SubdocPathNotFound);
        assert!(err.value.is_none());
    }

    #[test]
    fn mutation_result_success_carries_cas() {
        let ms = MutationResult::success(99);
        assert!(ms.is_success());
        assert_eq!(ms.cas, 99);

        let fail = MutationResult::failed(Status::KeyExists);
        assert!(!fail.is_success());
        assert_eq!(fail.cas, 0);
    }

    #[test]
    fn flag_bits_do_not_overlap() {
        assert_eq!(PATH_FLAG_MKDIR_P & PATH_FLAG_XATTR, 0);
        assert_eq!(DOC_FLAG_MKDOC & DOC_FLAG_ADD & DOC_FLAG_ACCESS_DELETED, 0);
    }
}
