//! Bucket: named collection of vbuckets with key routing
//!
//! Clients hash a key to a vbucket and stamp that vbucket id into the
//! request header. The server recomputes the mapping and answers
//! `NotMyVbucket` when they disagree, which is how drivers discover a stale
//! topology. The mapping is the CRC32-based one the production protocol
//! uses.

use std::sync::Arc;

use mockbase_core::{KeySpec, Status};

use crate::vbucket::VBucketStore;

/// Default vbucket count, matching the production deployment layout.
pub const DEFAULT_NUM_VBUCKETS: u16 = 1024;

/// A named bucket: `num_vbuckets` independent stores plus key routing.
pub struct Bucket {
    name: String,
    vbuckets: Vec<Arc<VBucketStore>>,
}

impl Bucket {
    /// Create a bucket with `num_vbuckets` empty stores.
    pub fn new(name: impl Into<String>, num_vbuckets: u16) -> Self {
        let count = num_vbuckets.max(1);
        Bucket {
            name: name.into(),
            vbuckets: (0..count).map(|_| Arc::new(VBucketStore::new())).collect(),
        }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of vbuckets.
    pub fn num_vbuckets(&self) -> u16 {
        self.vbuckets.len() as u16
    }

    /// The vbucket a key belongs to: `(crc32(key) >> 16) & 0x7fff`, modulo
    /// the vbucket count.
    pub fn vbucket_for(&self, key: &str) -> u16 {
        let hash = crc32fast::hash(key.as_bytes());
        (((hash >> 16) & 0x7fff) % u32::from(self.num_vbuckets())) as u16
    }

    /// Build a correctly routed key spec for a key.
    pub fn key_spec(&self, key: &str) -> KeySpec {
        KeySpec::new(key, self.vbucket_for(key))
    }

    /// The store owning a vbucket id, if the id is in range.
    pub fn vbucket(&self, id: u16) -> Option<&Arc<VBucketStore>> {
        self.vbuckets.get(usize::from(id))
    }

    /// Resolve the store for a request's key spec, verifying the client
    /// routed the key to the vbucket this bucket maps it to.
    pub fn cache_for(&self, key: &KeySpec) -> Result<&Arc<VBucketStore>, Status> {
        if key.vbucket() != self.vbucket_for(key.key()) {
            tracing::debug!(
                target: "mockbase::storage",
                key = %key.key(),
                got = key.vbucket(),
                want = self.vbucket_for(key.key()),
                "request routed to the wrong vbucket"
            );
            return Err(Status::NotMyVbucket);
        }
        // In-range by construction: vbucket_for is always < num_vbuckets.
        self.vbuckets
            .get(usize::from(key.vbucket()))
            .ok_or(Status::NotMyVbucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockbase_core::Item;

    #[test]
    fn routing_is_stable_and_in_range() {
        let bucket = Bucket::new("default", 64);
        for key in ["a", "user::17", "long-key-with-dashes", ""] {
            let vb = bucket.vbucket_for(key);
            assert!(vb < 64);
            assert_eq!(vb, bucket.vbucket_for(key));
        }
    }

    #[test]
    fn keys_spread_over_vbuckets() {
        let bucket = Bucket::new("default", 64);
        let mut seen = std::collections::HashSet::new();
        for i in 0..256 {
            seen.insert(bucket.vbucket_for(&format!("key-{}", i)));
        }
        // CRC32 routing should hit a healthy share of 64 vbuckets.
        assert!(seen.len() > 16, "only {} vbuckets hit", seen.len());
    }

    #[test]
    fn cache_for_rejects_misrouted_keys() {
        let bucket = Bucket::new("default", 64);
        let right = bucket.vbucket_for("k");
        let wrong = (right + 1) % 64;
        assert!(bucket.cache_for(&KeySpec::new("k", right)).is_ok());
        assert_eq!(
            bucket.cache_for(&KeySpec::new("k", wrong)).unwrap_err(),
            Status::NotMyVbucket
        );
    }

    #[test]
    fn items_land_in_their_routed_store() {
        let bucket = Bucket::new("default", 16);
        let spec = bucket.key_spec("doc");
        let store = bucket.cache_for(&spec).unwrap();
        store.add(Item::new(spec.clone(), 0, 0, b"{}".to_vec(), None, 0));
        assert!(bucket.cache_for(&spec).unwrap().get(&spec).is_some());
        // Other stores stay empty.
        let other = (spec.vbucket() + 1) % 16;
        assert!(bucket.vbucket(other).unwrap().is_empty());
    }

    #[test]
    fn at_least_one_vbucket() {
        let bucket = Bucket::new("tiny", 0);
        assert_eq!(bucket.num_vbuckets(), 1);
        assert_eq!(bucket.vbucket_for("anything"), 0);
    }
}
