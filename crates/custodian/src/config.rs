//! Application configuration.
//!
//! Everything has a default matching the Custodian web app, so an empty
//! JSON object (or no config file at all) is a valid configuration:
//!
//! ```json
//! {
//!   "storage": { "dir": ".custodian", "key": "access_token" },
//!   "routes": {
//!     "auth_route": "/",
//!     "home_route": "/dashboard",
//!     "default_class": "public",
//!     "rules": [
//!       { "path": "/", "class": "auth-only" },
//!       { "path": "/signup", "class": "auth-only" },
//!       { "path": "/dashboard", "class": "protected" }
//!     ]
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use custodian_guard::{GuardConfig, GuardError, NavigationGuard};
use custodian_store::{DEFAULT_STORAGE_KEY, StorageKey, StoreError};
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a [`CustodianConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Routes(#[from] GuardError),
}

/// Where the token lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the token file.
    pub dir: PathBuf,
    /// Name of the single persisted entry.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".custodian"),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodianConfig {
    pub storage: StorageConfig,
    pub routes: GuardConfig,
}

impl CustodianConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    /// Checks the storage key and the route layout, returning the config
    /// unchanged when both are usable.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.storage_key()?;
        NavigationGuard::new(self.routes.clone())?;
        Ok(self)
    }

    /// The configured storage key.
    pub fn storage_key(&self) -> Result<StorageKey, ConfigError> {
        Ok(StorageKey::new(self.storage.key.as_str())?)
    }
}
