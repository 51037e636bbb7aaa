//! Composite key: document key plus owning vbucket
//!
//! A key is only meaningful together with the vbucket the client routed it
//! to. Two requests naming the same key but different vbuckets address
//! different stores (and one of them will be answered with `NotMyVbucket`
//! by the routing layer).

use std::fmt;

/// Key of a document record, scoped to a vbucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySpec {
    key: String,
    vbucket: u16,
}

impl KeySpec {
    /// Create a key spec from its parts.
    pub fn new(key: impl Into<String>, vbucket: u16) -> Self {
        KeySpec {
            key: key.into(),
            vbucket,
        }
    }

    /// The document key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The vbucket this key was routed to.
    #[inline]
    pub fn vbucket(&self) -> u16 {
        self.vbucket
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@vb{}", self.key, self.vbucket)
    }
}
