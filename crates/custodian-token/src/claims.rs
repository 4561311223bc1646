//! Identity types produced by token decoding.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// SubjectId
// ---------------------------------------------------------------------------

/// The identifier of whoever a token was issued to.
///
/// For Custodian tokens this is the customer's login name (usually an
/// email address). It is always non-empty: the decoder rejects tokens
/// without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// IdentityClaims
// ---------------------------------------------------------------------------

/// The validated identity carried by a token.
///
/// There is no public constructor: the only way to get one is through a
/// [`TokenDecoder`](crate::TokenDecoder), so every value in circulation
/// came from a token that passed structural and expiry checks. Claims
/// are never persisted; they are re-derived from the token each time.
///
/// `Serialize` is implemented so UI code can hand the identity to a
/// template or a JS bridge. `Deserialize` is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityClaims {
    subject: SubjectId,
    roles: Vec<String>,
    name: Option<String>,
    email: Option<String>,
    issued_at: Option<u64>,
    expires_at: Option<u64>,
}

impl IdentityClaims {
    /// Assembles claims from already-validated parts.
    pub(crate) fn from_parts(
        subject: String,
        roles: Vec<String>,
        name: Option<String>,
        email: Option<String>,
        issued_at: Option<u64>,
        expires_at: Option<u64>,
    ) -> Self {
        Self {
            subject: SubjectId(subject),
            roles,
            name,
            email,
            issued_at,
            expires_at,
        }
    }

    /// Who the token was issued to.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Granted roles/authorities, in token order. May be empty.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns `true` if `role` was granted.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Optional display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Optional email address.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// When the token was issued (unix seconds), if it says.
    pub fn issued_at(&self) -> Option<u64> {
        self.issued_at
    }

    /// When the token stops being valid (unix seconds), if it says.
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// The best label to show for this identity: the display name when
    /// present, otherwise the subject.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(self.subject.as_str())
    }
}
