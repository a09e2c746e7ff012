//! Signed QR tokens.
//!
//! A token encodes `(session_code, expires_at)` as
//! `"{code}.{expires_unix}.{sig}"` where `sig` is the url-safe base64
//! HMAC-SHA256 of `"{code}.{expires_unix}"` under the service signing key.
//! Tokens are never persisted; possession of a valid token is equivalent to
//! knowing the session code until the expiry passes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Verification failure. Tampering always yields `Invalid`; only a token
/// whose signature checks out can be reported as `Expired`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed or its signature does not verify")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Signs `(session_code, expires_at)` into a compact token string.
pub fn mint(key: &[u8], session_code: &str, expires_at: DateTime<Utc>) -> String {
    let payload = format!("{}.{}", session_code, expires_at.timestamp());
    let sig = sign(key, &payload);
    format!("{}.{}", payload, sig)
}

/// Verifies a token and returns the embedded session code.
///
/// The signature is checked before the expiry so that a mutated token is
/// `Invalid` even when the mutation lands in the expiry field.
pub fn verify(key: &[u8], token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [code, exp_str, sig] = parts.as_slice() else {
        return Err(TokenError::Invalid);
    };

    let payload = format!("{}.{}", code, exp_str);
    let sig_bytes = URL_SAFE_NO_PAD
        .decode(sig.as_bytes())
        .map_err(|_| TokenError::Invalid)?;
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| TokenError::Invalid)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&sig_bytes).map_err(|_| TokenError::Invalid)?;

    let expires: i64 = exp_str.parse().map_err(|_| TokenError::Invalid)?;
    if now.timestamp() >= expires {
        return Err(TokenError::Expired);
    }

    Ok((*code).to_string())
}

/// Returns true when the input has the three-field shape of a signed token.
///
/// Session codes never contain dots, so this is enough to route an opaque
/// `code_or_token` input to the right resolution path.
pub fn looks_like_token(input: &str) -> bool {
    input.split('.').count() == 3
}

fn sign(key: &[u8], payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const KEY: &[u8] = b"test-signing-key";

    #[test]
    fn test_mint_verify_roundtrip() {
        let now = Utc::now();
        let token = mint(KEY, "A7K2P", now + Duration::hours(24));
        assert_eq!(verify(KEY, &token, now), Ok("A7K2P".to_string()));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let token = mint(KEY, "A7K2P", now - Duration::seconds(1));
        assert_eq!(verify(KEY, &token, now), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let token = mint(KEY, "A7K2P", now);
        // expires_at == now counts as elapsed
        assert_eq!(verify(KEY, &token, now), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let now = Utc::now();
        let token = mint(KEY, "A7K2P", now + Duration::hours(1));
        assert_eq!(
            verify(b"other-key", &token, now),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_any_single_bit_mutation_is_invalid() {
        let now = Utc::now();
        let token = mint(KEY, "A7K2P", now + Duration::hours(1));
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut mutated = bytes.to_vec();
            mutated[i] ^= 0x01;
            let Ok(mutated) = String::from_utf8(mutated) else {
                continue;
            };
            if mutated == token {
                continue;
            }
            assert_eq!(
                verify(KEY, &mutated, now),
                Err(TokenError::Invalid),
                "mutation at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let now = Utc::now();
        for bad in ["", "A7K2P", "A7K2P.123", "a.b.c.d", "A7K2P.notanum.sig"] {
            assert_eq!(verify(KEY, bad, now), Err(TokenError::Invalid), "{bad}");
        }
    }

    #[test]
    fn test_looks_like_token() {
        assert!(looks_like_token("A7K2P.1700000000.c2ln"));
        assert!(!looks_like_token("A7K2P"));
        assert!(!looks_like_token("A7K2P.123"));
    }
}
