//! Access token and card number generation.
//!
//! The access token is the sole lookup key on the public scan path and, when
//! no PIN is set, the sole credential. It is a 256-bit random value encoded
//! as hexadecimal with an `hc_` prefix, which makes guessing infeasible
//! within any rate-limit window.

use rand::Rng;

/// Prefix identifying card access tokens.
pub const TOKEN_PREFIX: &str = "hc_";

/// Total length of a generated access token: prefix + 64 hex chars.
pub const TOKEN_LENGTH: usize = 67;

/// Alphabet for card numbers, with ambiguous characters (0/O, 1/I) removed.
const CARD_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a new cryptographically secure access token.
///
/// # Format
///
/// `hc_{64 hex characters}` (67 characters total)
pub fn generate_access_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
}

/// Generate a human-readable card number such as `SMART-AB23-CD45`.
///
/// Display only; never a lookup key on the scan path. Uniqueness is enforced
/// by the caller against storage, retrying on collision.
pub fn generate_card_number(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut group = || -> String {
        (0..4)
            .map(|_| {
                let idx = rng.gen_range(0..CARD_NUMBER_ALPHABET.len());
                CARD_NUMBER_ALPHABET[idx] as char
            })
            .collect()
    };
    let part1 = group();
    let part2 = group();
    format!("{prefix}-{part1}-{part2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let token = generate_access_token();
        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(hex::decode(&token[TOKEN_PREFIX.len()..]).is_ok());
    }

    #[test]
    fn test_token_uniqueness() {
        let a = generate_access_token();
        let b = generate_access_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_card_number_format() {
        let number = generate_card_number("SMART");
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SMART");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 4);
        for c in parts[1].chars().chain(parts[2].chars()) {
            assert!(CARD_NUMBER_ALPHABET.contains(&(c as u8)), "unexpected char {c}");
        }
    }

    #[test]
    fn test_card_number_avoids_ambiguous_chars() {
        for _ in 0..50 {
            let number = generate_card_number("NHIS");
            assert!(!number.contains('0'));
            assert!(!number.contains('O'));
            assert!(!number.contains('1'));
            assert!(!number.contains('I'));
        }
    }
}
