use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Salted Argon2id hashing with an operator-chosen cost.
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    pub fn new(iterations: u32, memory_kib: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// PHC-formatted hash with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// False on mismatch and on a stored hash that cannot be parsed. The cost
    /// parameters embedded in the stored hash are the ones used.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashing() -> PasswordHashing {
        PasswordHashing::new(1, 8).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hashing = hashing();
        let hash = hashing.hash("greaterthaneight").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify("greaterthaneight", &hash));
        assert!(!hashing.verify("wrong", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hashing = hashing();
        assert_ne!(hashing.hash("same").unwrap(), hashing.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!hashing().verify("anything", "plaintext-in-db"));
    }

    #[test]
    fn test_rejects_impossible_cost() {
        assert!(matches!(PasswordHashing::new(0, 8), Err(PasswordError::Params(_))));
    }
}
