use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::AppError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash checked when a login names no user, so both failures cost the same.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("divvy-placeholder-password").unwrap_or_default());

/// Hash a password with Argon2id and a fresh random salt.
///
/// Returns a PHC string (`$argon2id$v=19$...`) carrying the parameters and salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Generic(format!("Failed to hash password: {e}")))
}

/// Check a password against a PHC string produced by [`hash_password`].
///
/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// A valid hash matching no real account.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}
