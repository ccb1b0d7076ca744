use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::ApiError;

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash. A hash that fails to
/// parse counts as a mismatch, not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("dummy").unwrap_or_default());

/// Burn one argon2 verification against a throwaway hash. Called on the
/// unknown-email login path so its timing matches the wrong-password path.
pub fn burn_verification(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}
