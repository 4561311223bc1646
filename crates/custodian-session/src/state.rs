//! The session state value and how it is derived from a token.

use std::fmt;

use custodian_token::{DecodeFailure, IdentityClaims, TokenDecoder};
use serde::Serialize;

/// The client's authentication status.
///
/// ```text
///                       ┌──(login)──→
///   Unknown ──(boot)──→ Anonymous    Authenticated
///      │                └←─(logout)──      ↑
///      └──────────────(boot)───────────────┘
/// ```
///
/// - **Unknown**: the persisted token has not been looked at yet. This
///   is transient and must never be read as "signed out".
/// - **Anonymous**: no token, or a token that did not decode.
/// - **Authenticated**: a token decoded into these claims.
///
/// Serialized with an explicit tag so UI bridges get
/// `{"status": "authenticated", "identity": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "identity", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(IdentityClaims),
}

impl SessionState {
    /// Derives the state for a (possibly absent) persisted token.
    ///
    /// This is the pure half of bootstrap: no storage access, and a
    /// decode failure downgrades to `Anonymous` instead of erroring.
    pub fn resolve<D>(token: Option<&str>, decoder: &D) -> Self
    where
        D: TokenDecoder + ?Sized,
    {
        let Some(token) = token else {
            return Self::Anonymous;
        };
        match decoder.decode(token) {
            Ok(claims) => Self::Authenticated(claims),
            Err(DecodeFailure::Expired { expired_at }) => {
                tracing::debug!(expired_at, "stored token has expired");
                Self::Anonymous
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "ignoring unusable stored token");
                Self::Anonymous
            }
        }
    }

    /// `false` only for `Unknown`.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The signed-in identity, if any.
    pub fn claims(&self) -> Option<&IdentityClaims> {
        match self {
            Self::Authenticated(claims) => Some(claims),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated(claims) => {
                write!(f, "authenticated({})", claims.subject())
            }
        }
    }
}
