//! Credential tokens for Custodian.
//!
//! This crate turns the opaque string the backend hands out into a
//! structured identity, or says why it can't:
//!
//! - **Claims** ([`IdentityClaims`], [`SubjectId`]): the validated
//!   identity. Only a decoder can create one.
//! - **Decoder** ([`TokenDecoder`] trait, [`JwtDecoder`]): local,
//!   network-free parsing with an expiry check.
//! - **Clock** ([`Clock`], [`SystemClock`], [`FixedClock`],
//!   [`ManualClock`]): where "now" comes from.
//! - **Errors** ([`DecodeFailure`]): malformed vs expired.
//!
//! ```text
//! Token Store (string) → Token Decoder (claims) → Session (state)
//! ```

mod claims;
mod clock;
mod decoder;
mod error;
#[cfg(feature = "mint")]
mod mint;

pub use claims::{IdentityClaims, SubjectId};
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use decoder::{JwtDecoder, TokenDecoder};
pub use error::DecodeFailure;
#[cfg(feature = "mint")]
pub use mint::mint_unsigned;
