//! Session-code generation.
//!
//! Codes are short strings meant to be read aloud and typed on a phone, so
//! the default alphabet drops the visually ambiguous characters 0/O and 1/I/L.

use rand::Rng;

/// Default alphabet: digits and uppercase letters minus 0, O, 1, I, L.
pub const DEFAULT_ALPHABET: &str = "23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Default session-code length.
pub const DEFAULT_CODE_LEN: usize = 5;

/// Generates a random session code from the given alphabet.
///
/// Uniqueness is not guaranteed here; the caller checks the store and
/// retries on collision.
pub fn generate(alphabet: &str, len: usize) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

/// Returns true when every character of `code` belongs to `alphabet`.
pub fn is_well_formed(code: &str, alphabet: &str, len: usize) -> bool {
    code.chars().count() == len && code.chars().all(|c| alphabet.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_uses_alphabet() {
        let code = generate(DEFAULT_ALPHABET, DEFAULT_CODE_LEN);
        assert_eq!(code.len(), DEFAULT_CODE_LEN);
        assert!(code.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
    }

    #[test]
    fn test_generate_respects_length() {
        for len in [4, 5, 8] {
            assert_eq!(generate(DEFAULT_ALPHABET, len).len(), len);
        }
    }

    #[test]
    fn test_default_alphabet_has_no_ambiguous_chars() {
        for c in ['0', 'O', '1', 'I', 'L'] {
            assert!(!DEFAULT_ALPHABET.contains(c));
        }
    }

    #[test]
    fn test_generate_varies() {
        // 31^5 codes; a hundred draws colliding on one value would mean a
        // broken generator, not bad luck.
        let codes: HashSet<String> = (0..100)
            .map(|_| generate(DEFAULT_ALPHABET, DEFAULT_CODE_LEN))
            .collect();
        assert!(codes.len() > 90);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("A7K2P", DEFAULT_ALPHABET, 5));
        assert!(!is_well_formed("A7K2", DEFAULT_ALPHABET, 5));
        assert!(!is_well_formed("A7K2O", DEFAULT_ALPHABET, 5));
        assert!(!is_well_formed("a7k2p", DEFAULT_ALPHABET, 5));
    }
}
