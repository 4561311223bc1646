/// Errors that can occur in the token store.
///
/// A missing token is NOT an error: [`TokenStore::load`](crate::TokenStore::load)
/// returns `Ok(None)` for that. Backend failures are fatal for the
/// caller; they are surfaced, never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("token storage unavailable")]
    Unavailable(#[source] std::io::Error),

    /// The storage key cannot name a single entry (empty, or contains
    /// a path separator).
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
