use async_trait::async_trait;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_welcome(&self, to: &str, username: &str) -> Result<(), EmailError>;

    async fn send_password_reset_otp(&self, to: &str, code: &str) -> Result<(), EmailError>;

    /// Verifies the transport can reach its server.
    async fn test_connection(&self) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email transport not configured")]
    NotConfigured,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("send failed: {0}")]
    SendFailed(String),
}
