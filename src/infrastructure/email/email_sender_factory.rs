use std::sync::Arc;

use super::{DisabledEmailSender, MailConfig, SmtpEmailSender};
use crate::application::ports::{EmailError, EmailSender};

pub struct EmailSenderFactory;

impl EmailSenderFactory {
    pub fn create(config: &MailConfig) -> Result<Arc<dyn EmailSender>, EmailError> {
        if !config.is_complete() {
            tracing::warn!("Mail host or credentials missing, email delivery disabled");
            return Ok(Arc::new(DisabledEmailSender));
        }
        Ok(Arc::new(SmtpEmailSender::new(config)?))
    }
}
