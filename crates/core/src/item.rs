//! Item: the durable document record
//!
//! An item carries two logically separate payload namespaces: the user-visible
//! `body` and the extended-attribute (`xattr`) metadata. Subdoc requests
//! address them independently via a per-spec flag bit; whole-document legacy
//! operations only ever touch the body.
//!
//! Items are never mutated in place by the executors. A request evaluates
//! against working copies and submits a *new* item to the cache, which is the
//! only place a CAS is assigned.

use crate::key::KeySpec;
use crate::time::Timestamp;

/// A single document record stored in a vbucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    key: KeySpec,
    flags: u32,
    expiry: u32,
    cas: u64,
    body: Vec<u8>,
    xattr: Option<Vec<u8>>,
    modification_time: Timestamp,
}

impl Item {
    /// Create an item. `cas` is the caller's CAS precondition (0 = none);
    /// the stored CAS is assigned by the cache on commit.
    pub fn new(
        key: KeySpec,
        flags: u32,
        expiry: u32,
        body: Vec<u8>,
        xattr: Option<Vec<u8>>,
        cas: u64,
    ) -> Self {
        Item {
            key,
            flags,
            expiry,
            cas,
            body,
            xattr,
            modification_time: Timestamp::EPOCH,
        }
    }

    /// The composite key of this item.
    #[inline]
    pub fn key(&self) -> &KeySpec {
        &self.key
    }

    /// Opaque 32-bit client metadata.
    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Absolute expiry time in seconds; 0 means the item never expires.
    #[inline]
    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    /// Set the absolute expiry time in seconds.
    pub fn set_expiry(&mut self, expiry: u32) {
        self.expiry = expiry;
    }

    /// Current CAS token. 0 on an item that has never been committed.
    #[inline]
    pub fn cas(&self) -> u64 {
        self.cas
    }

    /// Assign a CAS token and stamp the modification time.
    ///
    /// Only the cache calls this, on commit. The CAS changes if and only if
    /// a committed mutation changed body, xattr, flags or expiry.
    pub fn set_cas(&mut self, cas: u64) {
        self.modification_time = Timestamp::now();
        self.cas = cas;
    }

    /// The user-visible document content.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Extended-attribute metadata; `None` means no xattrs are stored.
    #[inline]
    pub fn xattr(&self) -> Option<&[u8]> {
        self.xattr.as_deref()
    }

    /// When the CAS last changed.
    #[inline]
    pub fn modification_time(&self) -> Timestamp {
        self.modification_time
    }

    /// Append raw bytes to the body (legacy whole-document operation).
    pub fn append(&mut self, suffix: &[u8]) {
        self.body.extend_from_slice(suffix);
    }

    /// Prepend raw bytes to the body (legacy whole-document operation).
    pub fn prepend(&mut self, prefix: &[u8]) {
        let mut dst = Vec::with_capacity(prefix.len() + self.body.len());
        dst.extend_from_slice(prefix);
        dst.extend_from_slice(&self.body);
        self.body = dst;
    }
}
