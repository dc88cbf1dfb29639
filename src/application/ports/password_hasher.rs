use async_trait::async_trait;

/// Hashing is CPU-bound; implementations run it off the async executor.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plain: &str) -> Result<String, PasswordHashError>;

    async fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordHashError {
    #[error("hashing failed: {0}")]
    HashFailed(String),
    #[error("verification failed: {0}")]
    VerifyFailed(String),
}
