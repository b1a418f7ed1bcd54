//! One-way password hashing seam (argon2id, PHC-format strings).
//!
//! The rest of the service treats hashes as opaque: [`hash_password`] at
//! registration, [`verify_password`] at login, nothing else ever inspects
//! them.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use taskboard_core::error::StoreError;

/// Hashes a password with argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns a [`StoreError`] if hashing fails; like any other unexpected
/// internal failure it surfaces to callers as a generic 500.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored PHC hash. Malformed hashes verify
/// as `false` rather than erroring -- the caller cannot fix them anyway.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
