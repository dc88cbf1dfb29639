use async_trait::async_trait;

use crate::application::ports::{EmailError, EmailSender};

/// Used when SMTP credentials are absent. Welcome mail is skipped; anything
/// the user depends on fails.
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send_welcome(&self, _to: &str, username: &str) -> Result<(), EmailError> {
        tracing::warn!(username, "Email transport not configured, skipping welcome email");
        Ok(())
    }

    async fn send_password_reset_otp(&self, _to: &str, _code: &str) -> Result<(), EmailError> {
        Err(EmailError::NotConfigured)
    }

    async fn test_connection(&self) -> Result<(), EmailError> {
        Err(EmailError::NotConfigured)
    }
}
