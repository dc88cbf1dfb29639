use crate::domain::{User, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    EncodingFailed(String),
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}
