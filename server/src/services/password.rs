//! Credential hashing — Argon2id with a fresh random salt per call.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash a plaintext password into a PHC-format secret.
///
/// Each call salts independently, so two hashes of the same plaintext differ.
/// The plaintext is never logged or retained beyond this call.
///
/// # Errors
///
/// Returns an error if the underlying KDF fails.
pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let secret = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(secret.to_string())
}

/// Verify a plaintext password against a stored secret.
///
/// A malformed secret verifies as `false` rather than erroring; the
/// comparison itself is constant-time inside the argon2 crate.
#[must_use]
pub fn verify_password(plaintext: &str, secret: &str) -> bool {
    match PasswordHash::new(secret) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
