use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{User, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `RepositoryError::Duplicate` when the username or email is taken.
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// `email` must already be normalized.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Any user holding the email or the username, active or not.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn update_password(&self, id: UserId, password_hash: &str)
    -> Result<(), RepositoryError>;
}
