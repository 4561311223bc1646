//! Token persistence for Custodian.
//!
//! The session core persists exactly one thing: the opaque credential
//! string handed out by the backend after a successful sign-in. This
//! crate provides the [`TokenStore`] trait that abstracts over where
//! that string lives, plus two implementations:
//!
//! - [`MemoryTokenStore`]: process-scoped, handy for tests and for
//!   embedders that bring their own persistence.
//! - [`FileTokenStore`]: one file per storage key inside a directory
//!   (feature `file`, on by default).
//!
//! # Feature Flags
//!
//! - `file` (default): file-backed store via `tokio::fs`

mod error;
#[cfg(feature = "file")]
mod file;
mod memory;

pub use error::StoreError;
#[cfg(feature = "file")]
pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

use std::fmt;
use std::future::Future;

/// The key the frontend has always kept its credential under.
pub const DEFAULT_STORAGE_KEY: &str = "access_token";

/// Name of the single persisted entry.
///
/// Validated on construction so that a file-backed store can use it
/// directly as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Creates a key, rejecting empty names, `.`/`..` and anything
    /// containing a path separator.
    pub fn new(key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let valid = !key.trim().is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if valid {
            Ok(Self(key))
        } else {
            Err(StoreError::InvalidKey(key))
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self(DEFAULT_STORAGE_KEY.to_string())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable persistence for a single credential token.
///
/// At most one token is held at a time: `save` overwrites, `clear`
/// removes, and `load` reports absence as `Ok(None)`.
///
/// Methods return `Send` futures so an `AuthContext` built on top of
/// a store can be driven from any Tokio task.
pub trait TokenStore: Send + Sync + 'static {
    /// Persists `token`, replacing any previous one.
    ///
    /// The write has completed by the time the future resolves.
    fn save(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns the persisted token, or `None` when there is none.
    fn load(
        &self,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Removes the persisted token. Clearing an empty store is a no-op.
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
