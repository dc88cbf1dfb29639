mod api_types;
mod auth;
mod content_processing;
mod email;
mod health;
mod params;
mod user_formats;

pub use api_types::{
    ContentResponse, MessageResponse, PageResponse, PaginationResponse, StatsResponse,
    TemplateResponse, UserResponse,
};
pub use auth::{
    forgot_password_handler, login_handler, profile_handler, register_handler,
    reset_password_handler,
};
pub use content_processing::{
    PROCESS_BODY_LIMIT, content_stats_handler, delete_content_handler, get_content_handler,
    list_content_by_format_handler, list_content_handler, process_content_handler,
    update_content_handler,
};
pub use email::test_email_connection_handler;
pub use health::health_handler;
pub use user_formats::{
    create_user_format_handler, delete_user_format_handler, get_user_format_handler,
    list_user_formats_handler, update_user_format_handler,
};
