mod auth_service;
mod content_service;
mod formatting_prompt;
mod processing_service;
mod template_service;

pub use auth_service::{
    AuthError, AuthPolicy, AuthService, AuthSession, EMAIL_CONNECTION_FAILED, EMAIL_CONNECTION_OK,
    EmailConnectionStatus, FORGOT_PASSWORD_MESSAGE, OtpRejection, PASSWORD_RESET_MESSAGE,
};
pub use content_service::{ContentError, ContentService, TOP_FORMATS_LIMIT};
pub use formatting_prompt::{
    DEFAULT_INSTRUCTION, PromptSource, UNTRANSCRIBABLE_MARKER, build_formatting_prompt,
    format_prompt_date,
};
pub use processing_service::{
    ProcessRequest, ProcessingError, ProcessingService, ProcessingState, ProviderRoutes,
    RetryPolicy,
};
pub use template_service::{TemplateError, TemplateService};
