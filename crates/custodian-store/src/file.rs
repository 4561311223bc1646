//! File-backed token store using `tokio::fs`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{StorageKey, StoreError, TokenStore};

/// A [`TokenStore`] that keeps the token in `<dir>/<key>`.
///
/// The file holds the raw token string and nothing else, so the layout
/// matches the browser's single `localStorage` entry. The directory is
/// created on first save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
    key: StorageKey,
}

impl FileTokenStore {
    /// Creates a store rooted at `dir` using the given key as file name.
    ///
    /// No I/O happens here; a missing directory only matters once a
    /// token is saved.
    pub fn new(dir: impl Into<PathBuf>, key: StorageKey) -> Self {
        Self {
            dir: dir.into(),
            key,
        }
    }

    /// Returns the full path of the token file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(self.key.as_str())
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TokenStore for FileTokenStore {
    async fn save(&self, token: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StoreError::Unavailable)?;

        // Write next to the target and rename so a crash mid-write never
        // leaves a truncated token behind.
        let path = self.path();
        let staging = self.dir.join(format!(".{}.tmp", self.key));
        tokio::fs::write(&staging, token)
            .await
            .map_err(StoreError::Unavailable)?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(StoreError::Unavailable)?;

        tracing::debug!(path = %path.display(), "token saved");
        Ok(())
    }

    /// Bytes that are not UTF-8 come back lossily converted: a corrupt
    /// token is for the decoder to reject, not a storage failure.
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let bytes = match tokio::fs::read(self.path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Unavailable(e)),
        };
        match String::from_utf8(bytes) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::warn!(path = %self.path().display(), "token file is not valid UTF-8");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let path = self.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "token cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e)),
        }
    }
}
