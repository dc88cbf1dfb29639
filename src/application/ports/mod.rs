mod content_repository;
mod email_sender;
mod formatting_provider;
mod otp_repository;
mod password_hasher;
mod provider_error;
mod repository_error;
mod template_repository;
mod token_service;
mod user_repository;

pub use content_repository::{
    ContentFilter, ContentQuery, ContentSortField, ProcessedContentRepository,
};
pub use email_sender::{EmailError, EmailSender};
pub use formatting_provider::{FormatSpec, FormattingProvider, ProviderCapabilities};
pub use otp_repository::OtpRepository;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use provider_error::ProviderError;
pub use repository_error::RepositoryError;
pub use template_repository::{TemplateQuery, TemplateRepository, TemplateSortField};
pub use token_service::{AuthClaims, TokenError, TokenService};
pub use user_repository::UserRepository;
