//! HMAC payload-signature verification.
//!
//! One verifier per digest: SHA-1 (the historical GitHub scheme), SHA-256
//! and SHA-512. Each strips the matching `shaN=` prefix if present,
//! computes `hex(HMAC(secret, payload))` and compares the hex strings in
//! constant time. The computed MAC is returned on success *and* carried
//! inside the error on mismatch, so hosts can log what they expected
//! without re-deriving it.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Payload signature did not match; carries the computed MAC for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid payload signature, expected {computed}")]
pub struct SignatureError {
    /// Hex-encoded MAC computed over the payload with the configured
    /// secret.
    pub computed: String,
}

/// Verify an HMAC-SHA1 payload signature.
///
/// Accepts the signature with or without a `sha1=` prefix. Returns the
/// computed hex MAC on success.
pub fn check_payload_signature(
    payload: &[u8],
    secret: &str,
    signature: &str,
) -> Result<String, SignatureError> {
    let provided = signature.strip_prefix("sha1=").unwrap_or(signature);
    verify::<Hmac<Sha1>>(payload, secret, provided)
}

/// Verify an HMAC-SHA256 payload signature (optional `sha256=` prefix).
pub fn check_payload_signature256(
    payload: &[u8],
    secret: &str,
    signature: &str,
) -> Result<String, SignatureError> {
    let provided = signature.strip_prefix("sha256=").unwrap_or(signature);
    verify::<Hmac<Sha256>>(payload, secret, provided)
}

/// Verify an HMAC-SHA512 payload signature (optional `sha512=` prefix).
pub fn check_payload_signature512(
    payload: &[u8],
    secret: &str,
    signature: &str,
) -> Result<String, SignatureError> {
    let provided = signature.strip_prefix("sha512=").unwrap_or(signature);
    verify::<Hmac<Sha512>>(payload, secret, provided)
}

/// Compute the hex MAC and compare it against the provided hex string.
fn verify<M: Mac + KeyInit>(
    payload: &[u8],
    secret: &str,
    provided: &str,
) -> Result<String, SignatureError> {
    // HMAC accepts keys of any length; `new_from_slice` only fails for
    // fixed-key MAC types, which are never instantiated here.
    let Ok(mut mac) = <M as Mac>::new_from_slice(secret.as_bytes()) else {
        return Err(SignatureError {
            computed: String::new(),
        });
    };
    mac.update(payload);
    let computed = hex_encode(&mac.finalize().into_bytes());

    if constant_time_eq(provided.as_bytes(), computed.as_bytes()) {
        Ok(computed)
    } else {
        Err(SignatureError { computed })
    }
}

/// Encode bytes to a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Constant-time byte comparison (XOR-based).
///
/// Time taken is independent of how many bytes match.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
