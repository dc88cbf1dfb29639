mod api_json;
mod auth_user;

pub use api_json::{ApiJson, ApiQuery};
pub use auth_user::AuthUser;
