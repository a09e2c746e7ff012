//! Cryptographic utilities for secret comparison and hashing.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares two secrets without leaking their content through timing.
///
/// Both sides are hashed first, so the byte-by-byte comparison runs over
/// fixed-length digests rather than the secrets themselves.
pub fn secret_eq(a: &str, b: &str) -> bool {
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_secret_eq_matches() {
        assert!(secret_eq("hunter2", "hunter2"));
    }

    #[test]
    fn test_secret_eq_rejects_mismatch() {
        assert!(!secret_eq("hunter2", "hunter3"));
        assert!(!secret_eq("hunter2", ""));
        assert!(!secret_eq("hunter2", "hunter22"));
    }
}
