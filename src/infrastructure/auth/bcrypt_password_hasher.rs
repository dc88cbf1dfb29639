use async_trait::async_trait;

use crate::application::ports::{PasswordHashError, PasswordHasher};

pub const DEFAULT_BCRYPT_COST: u32 = 12;

pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plain: &str) -> Result<String, PasswordHashError> {
        let plain = plain.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| PasswordHashError::HashFailed(e.to_string()))?
            .map_err(|e| PasswordHashError::HashFailed(e.to_string()))
    }

    async fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| PasswordHashError::VerifyFailed(e.to_string()))?
            .map_err(|e| PasswordHashError::VerifyFailed(e.to_string()))
    }
}
