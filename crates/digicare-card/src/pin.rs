//! PIN validation, hashing and verification.
//!
//! This module provides Argon2-based hashing for the optional card PIN.
//!
//! # Security
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//! - Verification always runs the full Argon2 comparison; the PIN's shape
//!   never short-circuits the check
//!
//! # Example
//!
//! ```
//! use digicare_card::config::PinPolicy;
//! use digicare_card::pin::{hash_pin, validate_pin, verify_pin};
//!
//! let policy = PinPolicy::default();
//! validate_pin("482915", &policy).unwrap();
//!
//! let hash = hash_pin("482915").unwrap();
//! assert!(verify_pin("482915", &hash).unwrap());
//! assert!(!verify_pin("000000", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PinPolicy;
use crate::error::{CardError, CardResult};

/// Validate a raw PIN against the configured policy.
///
/// # Errors
///
/// - [`CardError::InvalidPinFormat`] when the PIN is outside the length
///   bounds or contains a non-digit
/// - [`CardError::WeakPin`] when every digit is identical or the PIN is on
///   the sequential-pattern denylist
pub fn validate_pin(raw_pin: &str, policy: &PinPolicy) -> CardResult<()> {
    if raw_pin.len() < policy.min_length || raw_pin.len() > policy.max_length {
        return Err(CardError::invalid_pin_format(format!(
            "PIN must be {}-{} digits",
            policy.min_length, policy.max_length
        )));
    }
    if !raw_pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::invalid_pin_format(format!(
            "PIN must be {}-{} digits",
            policy.min_length, policy.max_length
        )));
    }

    let first = raw_pin.as_bytes()[0];
    if raw_pin.bytes().all(|b| b == first) {
        return Err(CardError::weak_pin("PIN must not repeat a single digit"));
    }
    if policy.denylist.iter().any(|weak| weak == raw_pin) {
        return Err(CardError::weak_pin("PIN is too predictable"));
    }

    Ok(())
}

/// Hash a PIN for storage using Argon2id with an OsRng salt.
///
/// Returns a PHC-formatted hash string. Overwriting the stored hash is the
/// caller's responsibility and must be a single atomic update.
pub fn hash_pin(raw_pin: &str) -> CardResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(raw_pin.as_bytes(), &salt)
        .map_err(|e| CardError::hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a PIN against a stored Argon2 hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch. The comparison runs
/// unconditionally against the hash regardless of the supplied PIN's length
/// or content. Errors only on a malformed stored hash.
pub fn verify_pin(raw_pin: &str, hash: &str) -> CardResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| CardError::hashing(e.to_string()))?;
    let result = Argon2::default().verify_password(raw_pin.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}
