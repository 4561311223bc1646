//! Unsigned token minting.
//!
//! Produces tokens in the layout [`JwtDecoder`](crate::JwtDecoder)
//! reads, with an `alg: none` header and an empty signature. Useful to
//! stand in for the credential-exchange backend in tests and demos.
//! Nothing here signs anything.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

/// Encodes `payload` as an unsigned compact JWT (`header.payload.`).
pub fn mint_unsigned(payload: &Value) -> String {
    let header = json!({"alg": "none", "typ": "JWT"});
    format!("{}.{}.", segment(&header), segment(payload))
}

fn segment(value: &Value) -> String {
    // Serializing a `Value` cannot fail: every map key is a string.
    URL_SAFE_NO_PAD.encode(value.to_string())
}
