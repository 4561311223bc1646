//! In-memory token store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{StoreError, TokenStore};

/// A [`TokenStore`] that keeps the token in process memory.
///
/// Never fails. Cloning is not supported on purpose: share it behind an
/// `Arc` or hand it to an `AuthContext`, which owns its store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`, as if a previous
    /// run of the app had saved it.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// Returns a copy of the stored token without going through the
    /// async trait. Convenient for assertions.
    pub fn peek(&self) -> Option<String> {
        self.slot().clone()
    }

    // A panic while holding the lock cannot leave a half-written
    // `Option<String>`, so a poisoned lock is still safe to use.
    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.slot().take();
        Ok(())
    }
}
