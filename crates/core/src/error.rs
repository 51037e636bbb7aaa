//! Error types for mockbase
//!
//! Protocol-level failures are `Status` codes (data in responses), not Rust
//! errors. This hierarchy covers the cases where the process itself fails:
//! I/O, malformed configuration, and codec-level violations bubbled up from
//! the wire crate. We use `thiserror` for the `Display`/`Error` impls.

use std::io;
use thiserror::Error;

/// Result type alias for mockbase operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the mock server.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A wire packet could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn display_config() {
        let err = Error::Config("num_vbuckets must be a power of two".into());
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("power of two"));
    }

    #[test]
    fn from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn result_alias() {
        fn ok() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(ok().unwrap(), 7);
    }
}
