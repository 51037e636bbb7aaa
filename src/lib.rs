//! mockbase - protocol-compatible mock of a distributed document store
//!
//! mockbase emulates the binary wire protocol of a distributed document
//! store, including its subdocument (path-addressed partial document)
//! extensions, so drivers and applications can be tested against realistic
//! server behavior without a production deployment.
//!
//! # Quick Start
//!
//! ```
//! use mockbase::{EmbeddedMock, MultiLookupRequest, MultiSpec, Operation, ResponsePacket, Status};
//!
//! let mock = EmbeddedMock::new();
//!
//! // Seed a document directly through the storage layer.
//! let key = mock.bucket().key_spec("user::1");
//! let store = mock.bucket().cache_for(&key).unwrap();
//! store.add(mockbase::Item::new(key.clone(), 0, 0, br#"{"name":"ada"}"#.to_vec(), None, 0));
//!
//! // Drive it over the wire like a client would.
//! let request = MultiLookupRequest {
//!     key,
//!     opaque: 1,
//!     doc_flags: 0,
//!     specs: [MultiSpec {
//!         op: Operation::Get,
//!         flags: 0,
//!         path: "name".to_string(),
//!         value: String::new(),
//!     }]
//!     .into_iter()
//!     .collect(),
//! };
//! let response_bytes = mock.dispatch(&request.encode()).unwrap();
//! let response = ResponsePacket::decode(&response_bytes).unwrap();
//! assert_eq!(response.status, Status::Success);
//! ```
//!
//! # Architecture
//!
//! The workspace splits along the same seams as the protocol: `core` (shared
//! types), `subdoc` (path algebra and the single-path evaluator), `storage`
//! (the CAS-checked bucket cache), `wire` (binary codec) and `engine` (the
//! multi-path executor and dispatch). This crate re-exports the public
//! surface and adds [`EmbeddedMock`], the in-process entry point.

use mockbase_core::Result;

pub use mockbase_core::{
    BucketCache, Error, Item, KeySpec, MutationResult, SpecResult, Status, Timestamp,
};
pub use mockbase_engine::{
    dispatch, execute_multi_lookup, execute_multi_mutation, execute_subdoc, telemetry,
    MockConfig, CONFIG_FILE_NAME, DEFAULT_CREATE_RETRY_LIMIT,
};
pub use mockbase_storage::{Bucket, VBucketStore};
pub use mockbase_subdoc::{evaluate_lookup, evaluate_mutation, Operation, Path, ResultInfo};
pub use mockbase_wire::{
    CodecError, MultiLookupRequest, MultiMutationRequest, MultiSpec, RequestPacket,
    ResponsePacket, SubdocRequest,
};

/// An in-process mock server instance: one bucket plus packet dispatch.
///
/// Runs the mock in the same process as the code under test, replacing the
/// socket round-trip with [`EmbeddedMock::dispatch`].
pub struct EmbeddedMock {
    config: MockConfig,
    bucket: Bucket,
}

impl EmbeddedMock {
    /// Create a mock with the default configuration.
    pub fn new() -> Self {
        // The default config always validates.
        let config = MockConfig::default();
        let bucket = Bucket::new(config.bucket.clone(), config.num_vbuckets);
        EmbeddedMock { config, bucket }
    }

    /// Create a mock from a validated configuration.
    pub fn with_config(config: MockConfig) -> Result<Self> {
        config.validate()?;
        let bucket = Bucket::new(config.bucket.clone(), config.num_vbuckets);
        Ok(EmbeddedMock { config, bucket })
    }

    /// The active configuration.
    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// The bucket served by this instance.
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Execute one framed request and return the framed response.
    pub fn dispatch(&self, request: &[u8]) -> Result<Vec<u8>> {
        Ok(mockbase_engine::dispatch(
            request,
            &self.bucket,
            self.config.create_retry_limit,
        )?)
    }
}

impl Default for EmbeddedMock {
    fn default() -> Self {
        Self::new()
    }
}
