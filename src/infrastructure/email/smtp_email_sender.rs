use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::MailConfig;
use crate::application::ports::{EmailError, EmailSender};

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &MailConfig) -> Result<Self, EmailError> {
        let (Some(host), Some(username), Some(password)) = (
            config.host.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
        ) else {
            return Err(EmailError::NotConfigured);
        };

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| EmailError::SendFailed(format!("transport: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", config.from, e)))?;

        Ok(Self { transport, from })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        tracing::info!(subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_welcome(&self, to: &str, username: &str) -> Result<(), EmailError> {
        let body = format!(
            "Hi {},\n\nWelcome to WhisperLog. Turn quick voice notes and rough text into \
             structured notes with your own templates.\n\nThe WhisperLog team",
            username
        );
        self.send(to, "Welcome to WhisperLog!", body).await
    }

    async fn send_password_reset_otp(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let body = format!(
            "Use the following code to reset your WhisperLog password:\n\n    {}\n\n\
             The code expires in 10 minutes. If you did not request a reset, ignore this email.",
            code
        );
        self.send(to, "Reset Your Password - WhisperLog", body).await
    }

    async fn test_connection(&self) -> Result<(), EmailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EmailError::SendFailed(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(EmailError::SendFailed(e.to_string())),
        }
    }
}
