//! Webhook Signature
//!
//! Payment notifications carry an HMAC-SHA256 over the raw request body,
//! hex-encoded in the `X-Webhook-Signature` header. Verification uses
//! ring's constant-time compare and happens before the body is even
//! parsed; a bad signature causes no state access at all.

use ring::hmac;

use crate::utils::{AppError, AppResult};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Hex HMAC-SHA256 of `body` under `secret`
pub fn sign(secret: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hex::encode(hmac::sign(&key, body).as_ref())
}

/// Verify a hex signature against the raw body
pub fn verify(secret: &str, body: &[u8], signature_hex: &str) -> AppResult<()> {
    let signature = hex::decode(signature_hex).map_err(|_| AppError::InvalidSignature)?;
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(&key, body, &signature).map_err(|_| AppError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_verifies() {
        let body = br#"{"kind":"payment_succeeded","session_id":"cs_1"}"#;
        let signature = sign("topsecret", body);
        assert!(verify("topsecret", body, &signature).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = b"payload";
        let signature = sign("topsecret", body);
        assert!(verify("other", body, &signature).is_err());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signature = sign("topsecret", b"payload");
        assert!(verify("topsecret", b"payload2", &signature).is_err());
    }

    #[test]
    fn garbage_signature_is_rejected() {
        assert!(verify("topsecret", b"payload", "not-hex").is_err());
        assert!(verify("topsecret", b"payload", "").is_err());
    }
}
