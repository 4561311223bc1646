//! Error types for the session layer.

use custodian_store::StoreError;
use custodian_token::DecodeFailure;

/// Errors surfaced by [`AuthContext`](crate::AuthContext) transitions.
///
/// Decode failures during bootstrap or revalidation are NOT errors:
/// they quietly produce an anonymous session. The variants here are the
/// two situations a caller has to know about.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token store could not be read or written. This is an
    /// environment problem, not something a retry will fix.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// A token handed over right after a successful credential exchange
    /// did not decode. The backend and the client disagree about the
    /// token format; the session was left as it was.
    #[error("token from a successful sign-in could not be decoded")]
    PostLoginConsistency(#[source] DecodeFailure),
}
