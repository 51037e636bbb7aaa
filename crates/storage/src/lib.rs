//! Storage layer: the bucket cache collaborator
//!
//! A [`Bucket`] is a named set of vbuckets; each [`VBucketStore`] is a
//! concurrent key→item map with CAS-checked mutation primitives. The store
//! is the sole serialization point for a key: `add`/`replace`/`delete` are
//! atomic per entry, and every successful mutation assigns a fresh CAS from
//! a monotonically increasing allocator.
//!
//! Expiry is logical: expired items are filtered at read time and reaped
//! when `purge_expired` runs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bucket;
pub mod vbucket;

pub use bucket::Bucket;
pub use vbucket::VBucketStore;
