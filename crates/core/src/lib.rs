//! Core types and traits for mockbase
//!
//! This crate defines the foundational types used throughout the mock:
//! - Item: the durable document record (body + xattr namespaces, CAS)
//! - KeySpec: composite key (key string + vbucket id)
//! - Status: binary-protocol status codes
//! - SpecResult / MutationResult: per-operation outcome types
//! - Timestamp: microsecond wall-clock newtype
//! - BucketCache: the storage collaborator contract
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod item;
pub mod key;
pub mod status;
pub mod time;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use item::Item;
pub use key::KeySpec;
pub use status::Status;
pub use time::Timestamp;
pub use traits::BucketCache;
pub use types::{
    MutationResult, SpecResult, DOC_FLAG_ACCESS_DELETED, DOC_FLAG_ADD, DOC_FLAG_MKDOC,
    PATH_FLAG_MKDIR_P, PATH_FLAG_XATTR,
};
