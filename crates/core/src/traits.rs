//! Core trait definitions
//!
//! `BucketCache` is the contract the executors consume. The concrete
//! implementation lives in the storage crate; tests substitute fakes to
//! drive race and failure paths deterministically.

use crate::item::Item;
use crate::key::KeySpec;
use crate::types::MutationResult;

/// Per-vbucket key→item store with CAS-checked mutation primitives.
///
/// The cache is the sole serialization point for a key: all visibility and
/// atomicity guarantees come from `add`/`replace`/`delete` being atomic per
/// key. Callers never lock the cache themselves.
pub trait BucketCache: Send + Sync {
    /// Fetch a copy of the live item, or `None` when the key is absent
    /// (including items past their expiry).
    fn get(&self, key: &KeySpec) -> Option<Item>;

    /// Store a new item. Fails with `KeyExists` when the key is live.
    /// On success the stored item carries a freshly assigned CAS.
    fn add(&self, item: Item) -> MutationResult;

    /// Replace an existing item. Fails with `KeyNotFound` when the key is
    /// absent, and with `KeyExists` when the incoming item carries a
    /// non-zero CAS differing from the stored one.
    fn replace(&self, item: Item) -> MutationResult;

    /// CAS-checked removal. A zero `cas` removes unconditionally.
    fn delete(&self, key: &KeySpec, cas: u64) -> MutationResult;
}
