//! Cryptographic Utilities
//!
//! Random tokens and HMAC-signed cookie payloads. Signed tokens have the
//! shape `base64url(payload).base64url(hmac_sha256(key, base64url(payload)))`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Error when decoding a signed token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Token signature mismatch")]
    BadSignature,
    #[error("Token payload is not valid UTF-8")]
    Encoding,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random URL-safe token built from `len` bytes of entropy
pub fn random_token(len: usize) -> String {
    to_base64url(&random_bytes(len))
}

/// Encode bytes as unpadded base64url
pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Sign `payload` with `key`
pub fn sign_token(key: &[u8], payload: &str) -> String {
    let body = to_base64url(payload.as_bytes());
    let signature = hmac_sha256(key, body.as_bytes());
    format!("{}.{}", body, to_base64url(&signature))
}

/// Verify a token produced by [`sign_token`] and return its payload
pub fn verify_token(key: &[u8], token: &str) -> Result<String, TokenError> {
    let (body, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let signature = from_base64url(signature_b64).map_err(|_| TokenError::Malformed)?;

    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(body.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let payload = from_base64url(body).map_err(|_| TokenError::Malformed)?;
    String::from_utf8(payload).map_err(|_| TokenError::Encoding)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
