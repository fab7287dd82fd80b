use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::AppError;

/// Adaptive one-way hasher used for login passwords, refresh-token secrets
/// and password-reset codes alike. The cost factor scales the Argon2id
/// memory parameter as 2^cost KiB, so brute-forcing scales with the cost.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    cost: u32,
}

impl SecretHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AppError> {
        let params = Params::new(1u32 << self.cost, 3, 1, None)
            .map_err(|err| AppError::internal(format!("Invalid hash parameters: {err}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut thread_rng());
        let digest = self
            .argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|_| AppError::internal("Secret hashing failed"))?
            .to_string();
        Ok(digest)
    }

    pub fn verify(&self, secret: &str, digest: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|_| AppError::internal("Invalid stored secret hash"))?;

        // Parameters travel inside the PHC string, so verification keeps
        // working across cost-factor changes.
        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_HASH_COST as u32)
    }
}
