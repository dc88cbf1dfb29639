mod content_id;
mod content_type;
mod otp;
mod otp_id;
mod otp_type;
mod pagination;
mod placeholder;
mod processed_content;
mod processing_stats;
mod template;
mod template_id;
mod user;
mod user_id;

pub use content_id::ContentId;
pub use content_type::ContentType;
pub use otp::Otp;
pub use otp_id::OtpId;
pub use otp_type::OtpType;
pub use pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageInfo, PageRequest, SortOrder,
};
pub use placeholder::{WELL_KNOWN_PLACEHOLDERS, find_leaked_placeholders, template_placeholders};
pub use processed_content::{
    OwnerSummary, ProcessedContent, ProcessedContentView, ProcessingMetadata, TemplateSummary,
};
pub use processing_stats::{ProcessingStats, TemplateUsage};
pub use template::{NewTemplate, Template, TemplateChanges};
pub use template_id::TemplateId;
pub use user::{User, normalize_email};
pub use user_id::UserId;
