//! Token decoding: opaque string in, validated identity out.
//!
//! Custodian's backend issues compact JWTs: three base64url segments
//! (`header.payload.signature`) joined by dots. The client never verifies
//! the signature; that is the backend's job on every request. What the
//! client needs is the identity inside the payload, and a reliable "no"
//! for anything that does not look like a usable token.
//!
//! The [`TokenDecoder`] trait is the seam: the session layer only talks
//! to the trait, so embedders with a different token format plug in
//! their own decoder.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Clock, DecodeFailure, IdentityClaims, SystemClock};

/// Parses an opaque token into [`IdentityClaims`].
///
/// Implementations must be pure and local: no network, no storage.
/// Given the same token at the same instant they must return the same
/// result.
pub trait TokenDecoder: Send + Sync + 'static {
    /// Decodes `token`.
    ///
    /// # Errors
    /// - [`DecodeFailure::Malformed`]: wrong structure or no subject
    /// - [`DecodeFailure::Expired`]: embedded expiry has passed
    fn decode(&self, token: &str) -> Result<IdentityClaims, DecodeFailure>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// The payload fields we understand. Unknown fields are ignored.
///
/// The backend calls the granted authorities `scopes`; other issuers use
/// `roles` or `authorities`, which are accepted as aliases.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default, alias = "roles", alias = "authorities")]
    scopes: Vec<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    iat: Option<u64>,
    #[serde(default)]
    exp: Option<u64>,
}

// ---------------------------------------------------------------------------
// JwtDecoder
// ---------------------------------------------------------------------------

/// A [`TokenDecoder`] for unverified compact JWTs.
///
/// Expiry is checked against the decoder's [`Clock`]: a token is expired
/// once `now >= exp`. Tokens without `exp` never expire client-side.
#[derive(Debug, Clone, Default)]
pub struct JwtDecoder<C: Clock = SystemClock> {
    clock: C,
}

impl JwtDecoder {
    /// Creates a decoder that reads the wall clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> JwtDecoder<C> {
    /// Creates a decoder with an explicit time source.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Returns the decoder's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> TokenDecoder for JwtDecoder<C> {
    fn decode(&self, token: &str) -> Result<IdentityClaims, DecodeFailure> {
        let mut segments = token.trim().split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(malformed("expected three dot-separated segments"));
        };

        // The header is not used, but a token whose header is garbage is
        // not a JWT and should not be trusted for its payload either.
        decode_object(header, "header")?;
        let payload = decode_object(payload, "payload")?;

        let wire: WireClaims = serde_json::from_value(Value::Object(payload))
            .map_err(|e| malformed(&format!("payload claims: {e}")))?;

        let subject = match wire.sub {
            Some(sub) if !sub.trim().is_empty() => sub,
            _ => return Err(malformed("missing subject")),
        };

        if let Some(exp) = wire.exp {
            if self.clock.now() >= exp {
                return Err(DecodeFailure::Expired { expired_at: exp });
            }
        }

        Ok(IdentityClaims::from_parts(
            subject,
            wire.scopes,
            wire.name,
            wire.email,
            wire.iat,
            wire.exp,
        ))
    }
}

/// Decodes one base64url segment and parses it as a JSON object.
///
/// Padding is tolerated even though compact JWTs omit it.
fn decode_object(
    segment: &str,
    which: &str,
) -> Result<Map<String, Value>, DecodeFailure> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| malformed(&format!("{which} is not base64url")))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed(&format!("{which} is not a JSON object"))),
        Err(_) => Err(malformed(&format!("{which} is not JSON"))),
    }
}

fn malformed(reason: &str) -> DecodeFailure {
    DecodeFailure::Malformed(reason.to_string())
}
