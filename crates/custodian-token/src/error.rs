//! Decode failures.
//!
//! Both variants are recoverable from the session's point of view: a
//! token that fails to decode just means "nobody is signed in". Only
//! the session layer decides when a failure is worth escalating.

/// Why a token could not be turned into [`IdentityClaims`](crate::IdentityClaims).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    /// The token does not have the expected structure, or it parses but
    /// carries no subject identifier.
    ///
    /// The string is a short human-readable reason for logs. It never
    /// contains the token itself.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token's embedded expiry (unix seconds) is not in the future.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: u64 },
}
