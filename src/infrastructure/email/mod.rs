mod disabled_email_sender;
mod email_sender_factory;
mod mail_config;
mod smtp_email_sender;

pub use disabled_email_sender::DisabledEmailSender;
pub use email_sender_factory::EmailSenderFactory;
pub use mail_config::MailConfig;
pub use smtp_email_sender::SmtpEmailSender;
