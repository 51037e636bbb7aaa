//! Per-vbucket item store
//!
//! Replaces coarse map locking with a sharded concurrent map: lock-free
//! reads, per-entry write locking, O(1) lookups with a fast non-crypto hash.
//!
//! # Design
//!
//! - `DashMap<String, Item>` with `FxHasher`: per-entry atomicity for the
//!   CAS-checked mutation primitives
//! - `AtomicU64` CAS allocator: unique, monotonically increasing tokens
//! - Expiry index under `parking_lot::RwLock`: expiry second → keys, so
//!   `purge_expired` is O(expired) instead of O(total)
//!
//! # Concurrency contract
//!
//! The entry-level lock taken by `add`/`replace`/`delete` is the only
//! serialization point for a key. Two racing `add`s for the same key
//! resolve to exactly one winner; the loser observes `KeyExists`.

use std::collections::BTreeMap;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashSet, FxHasher};

use mockbase_core::{Item, KeySpec, MutationResult, Status, Timestamp};

type FxBuild = BuildHasherDefault<FxHasher>;

/// Concurrent key→item store for one vbucket.
#[derive(Debug)]
pub struct VBucketStore {
    items: DashMap<String, Item, FxBuild>,
    /// Expiry second → keys possibly expiring at that second.
    expiry_index: RwLock<BTreeMap<u64, FxHashSet<String>>>,
    cas_counter: AtomicU64,
}

impl VBucketStore {
    /// Create an empty store. CAS tokens start at 1; 0 is reserved for
    /// "no CAS".
    pub fn new() -> Self {
        VBucketStore {
            items: DashMap::with_hasher(FxBuild::default()),
            expiry_index: RwLock::new(BTreeMap::new()),
            cas_counter: AtomicU64::new(0),
        }
    }

    fn next_cas(&self) -> u64 {
        self.cas_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_expired(item: &Item) -> bool {
        item.expiry() != 0 && Timestamp::now().as_secs() >= u64::from(item.expiry())
    }

    fn index_expiry(&self, item: &Item) {
        if item.expiry() != 0 {
            self.expiry_index
                .write()
                .entry(u64::from(item.expiry()))
                .or_default()
                .insert(item.key().key().to_string());
        }
    }

    /// Fetch a copy of the live item. Expired items are absent.
    pub fn get(&self, key: &KeySpec) -> Option<Item> {
        let entry = self.items.get(key.key())?;
        if Self::is_expired(entry.value()) {
            return None;
        }
        Some(entry.value().clone())
    }

    /// Store a new item. Fails with `KeyExists` when the key is live; a key
    /// occupied only by an expired item is overwritten.
    pub fn add(&self, mut item: Item) -> MutationResult {
        match self.items.entry(item.key().key().to_string()) {
            Entry::Occupied(mut occupied) => {
                if !Self::is_expired(occupied.get()) {
                    return MutationResult::failed(Status::KeyExists);
                }
                let cas = self.next_cas();
                item.set_cas(cas);
                self.index_expiry(&item);
                occupied.insert(item);
                MutationResult::success(cas)
            }
            Entry::Vacant(vacant) => {
                let cas = self.next_cas();
                item.set_cas(cas);
                self.index_expiry(&item);
                vacant.insert(item);
                MutationResult::success(cas)
            }
        }
    }

    /// Replace an existing item, honoring the incoming CAS precondition
    /// (non-zero CAS must equal the stored CAS).
    pub fn replace(&self, mut item: Item) -> MutationResult {
        match self.items.entry(item.key().key().to_string()) {
            Entry::Occupied(mut occupied) => {
                if Self::is_expired(occupied.get()) {
                    occupied.remove();
                    return MutationResult::failed(Status::KeyNotFound);
                }
                if item.cas() != 0 && item.cas() != occupied.get().cas() {
                    return MutationResult::failed(Status::KeyExists);
                }
                let cas = self.next_cas();
                item.set_cas(cas);
                self.index_expiry(&item);
                occupied.insert(item);
                MutationResult::success(cas)
            }
            Entry::Vacant(_) => MutationResult::failed(Status::KeyNotFound),
        }
    }

    /// CAS-checked removal. A zero `cas` removes unconditionally.
    pub fn delete(&self, key: &KeySpec, cas: u64) -> MutationResult {
        match self.items.entry(key.key().to_string()) {
            Entry::Occupied(occupied) => {
                if Self::is_expired(occupied.get()) {
                    occupied.remove();
                    return MutationResult::failed(Status::KeyNotFound);
                }
                if cas != 0 && cas != occupied.get().cas() {
                    return MutationResult::failed(Status::KeyExists);
                }
                occupied.remove();
                MutationResult::success(self.next_cas())
            }
            Entry::Vacant(_) => MutationResult::failed(Status::KeyNotFound),
        }
    }

    /// Drop every item whose expiry second is in the past.
    ///
    /// Returns the number of items removed. Keys whose item was re-stored
    /// with a later expiry are left alone.
    pub fn purge_expired(&self) -> usize {
        let now = Timestamp::now().as_secs();
        let due: Vec<String> = {
            let mut index = self.expiry_index.write();
            let mut due = Vec::new();
            let still_live = index.split_off(&(now + 1));
            for keys in index.values() {
                due.extend(keys.iter().cloned());
            }
            *index = still_live;
            due
        };

        let mut removed = 0;
        for key in due {
            if let Entry::Occupied(occupied) = self.items.entry(key) {
                if Self::is_expired(occupied.get()) {
                    occupied.remove();
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            tracing::debug!(target: "mockbase::storage", removed, "purged expired items");
        }
        removed
    }

    /// Number of stored items, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for VBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl mockbase_core::BucketCache for VBucketStore {
    fn get(&self, key: &KeySpec) -> Option<Item> {
        VBucketStore::get(self, key)
    }

    fn add(&self, item: Item) -> MutationResult {
        VBucketStore::add(self, item)
    }

    fn replace(&self, item: Item) -> MutationResult {
        VBucketStore::replace(self, item)
    }

    fn delete(&self, key: &KeySpec, cas: u64) -> MutationResult {
        VBucketStore::delete(self, key, cas)
    }
}
