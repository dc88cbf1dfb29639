mod in_memory_repository;
mod pg_content_repository;
mod pg_error;
mod pg_otp_repository;
mod pg_template_repository;
mod pg_user_repository;

pub use in_memory_repository::InMemoryRepository;
pub use pg_content_repository::PgProcessedContentRepository;
pub use pg_otp_repository::PgOtpRepository;
pub use pg_template_repository::PgTemplateRepository;
pub use pg_user_repository::PgUserRepository;
