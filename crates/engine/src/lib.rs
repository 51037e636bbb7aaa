//! Command execution engine
//!
//! The engine sits between the wire codec and the storage layer:
//! - [`multi`]: the multi-path executor — sequential spec application over
//!   the body and xattr namespaces, all-or-nothing commit under CAS, and the
//!   bounded create-race retry
//! - [`single`]: the single-path executor
//! - [`dispatch`]: one-packet routing across the subdoc opcode family
//! - [`config`]: `mockbase.toml` loading
//! - [`telemetry`]: idempotent tracing setup
//!
//! The engine holds no state across requests; persisted state is entirely
//! owned by the storage layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatch;
pub mod multi;
pub mod single;
pub mod telemetry;

pub use config::{MockConfig, CONFIG_FILE_NAME, DEFAULT_CREATE_RETRY_LIMIT};
pub use dispatch::dispatch;
pub use multi::{execute_multi_lookup, execute_multi_mutation};
pub use single::execute_subdoc;
