//! Engine configuration via `mockbase.toml`
//!
//! A simple config file instead of a builder: on first use a commented
//! default file can be written next to the test fixtures, and edits take
//! effect on the next start.

use serde::{Deserialize, Serialize};
use std::path::Path;

use mockbase_core::{Error, Result};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "mockbase.toml";

/// Default bound for the create-race retry loop.
pub const DEFAULT_CREATE_RETRY_LIMIT: usize = 8;

/// Engine configuration loaded from `mockbase.toml`.
///
/// # Example
///
/// ```toml
/// bucket = "default"
/// num_vbuckets = 1024
/// create_retry_limit = 8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MockConfig {
    /// Bucket name served by the mock.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Number of vbuckets the bucket is split into.
    #[serde(default = "default_num_vbuckets")]
    pub num_vbuckets: u16,
    /// How many times a multi-mutation may re-run after losing a create
    /// race before surfacing `TemporaryFailure`.
    #[serde(default = "default_create_retry_limit")]
    pub create_retry_limit: usize,
}

fn default_bucket() -> String {
    "default".to_string()
}

fn default_num_vbuckets() -> u16 {
    1024
}

fn default_create_retry_limit() -> usize {
    DEFAULT_CREATE_RETRY_LIMIT
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            bucket: default_bucket(),
            num_vbuckets: default_num_vbuckets(),
            create_retry_limit: default_create_retry_limit(),
        }
    }
}

impl MockConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# mockbase configuration
#
# Name of the bucket served by the mock.
bucket = "default"

# Number of vbuckets keys are hashed across. Drivers cache this as part of
# the topology, so changing it invalidates client-side routing.
num_vbuckets = 1024

# Bound on the create-race retry loop of multi-mutations. Past this many
# lost races the request fails with a temporary-failure status.
create_retry_limit = 8
"#
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(Error::Config("bucket name must not be empty".to_string()));
        }
        if self.num_vbuckets == 0 {
            return Err(Error::Config(
                "num_vbuckets must be at least 1".to_string(),
            ));
        }
        if self.create_retry_limit == 0 {
            return Err(Error::Config(
                "create_retry_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MockConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }
}
