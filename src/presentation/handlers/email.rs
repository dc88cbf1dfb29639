use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::extractors::AuthUser;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct EmailConnectionResponse {
    pub success: bool,
    pub message: String,
}

#[tracing::instrument(skip(state, _user))]
pub async fn test_email_connection_handler(
    State(state): State<AppState>,
    _user: AuthUser,
) -> impl IntoResponse {
    let status = state.auth_service.test_email_connection().await;
    Json(EmailConnectionResponse {
        success: status.success,
        message: status.message,
    })
}
