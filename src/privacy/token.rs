use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::TokenError;

pub const TOKEN_LENGTH: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies confirmation tokens.
#[derive(Debug, Clone)]
pub struct TokenHasher {
    params: Params,
}

impl TokenHasher {
    pub fn new(config: HashingConfig) -> Result<Self, TokenError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| TokenError::Hash(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `token` with a fresh random salt into a PHC string.
    pub fn hash(&self, token: &str) -> Result<String, TokenError> {
        let mut salt_bytes = [0u8; 16];
        rand::rng().fill(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| TokenError::Hash(e.to_string()))?;

        self.argon2()
            .hash_password(token.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| TokenError::Hash(e.to_string()))
    }

    /// Check `token` against a stored PHC string.
    ///
    /// Parameters are read from the stored hash, so hashes made under an
    /// older cost configuration still verify.
    pub fn verify(&self, token: &str, stored_hash: &str) -> Result<bool, TokenError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| TokenError::MalformedHash(e.to_string()))?;
        Ok(self.argon2().verify_password(token.as_bytes(), &parsed).is_ok())
    }
}

impl Default for TokenHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

/// Generate a random alphanumeric confirmation token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> TokenHasher {
        TokenHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("secret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret"));
        assert!(hasher.verify("secret", &hash).unwrap());
        assert!(!hasher.verify("Secret", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap_hasher();
        assert_ne!(hasher.hash("secret").unwrap(), hasher.hash("secret").unwrap());
    }

    #[test]
    fn test_verify_uses_params_from_stored_hash() {
        let hash = cheap_hasher().hash("secret").unwrap();
        let other = TokenHasher::new(HashingConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("secret", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let result = cheap_hasher().verify("secret", "not-a-phc-string");
        assert!(matches!(result, Err(TokenError::MalformedHash(_))));
    }

    #[test]
    fn test_generated_tokens_are_alphanumeric() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = TokenHasher::new(HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }
}
