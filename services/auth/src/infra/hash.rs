use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::repository::SecretHasher;
use crate::error::AuthServiceError;

/// Argon2id hasher used for both passwords and OTP codes. Salted per hash;
/// verification is constant-time.
#[derive(Clone, Default)]
pub struct ArgonHasher;

impl SecretHasher for ArgonHasher {
    fn hash(&self, plain: &str) -> Result<String, AuthServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| AuthServiceError::Internal(anyhow!("hash secret: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AuthServiceError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthServiceError::Internal(anyhow!("parse stored hash: {e}")))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
