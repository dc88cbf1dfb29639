use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use super::api_types::{MessageResponse, UserResponse};
use crate::application::services::AuthSession;
use crate::presentation::error::ApiError;
use crate::presentation::extractors::{ApiJson, AuthUser};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: UserResponse::from(&session.user),
            access_token: session.access_token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[tracing::instrument(skip(state, request))]
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth_service
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

#[tracing::instrument(skip(state, request))]
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(AuthResponse::from(session)))
}

#[tracing::instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn profile_handler(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth_service.profile(claims.user_id).await?;
    Ok(Json(ProfileResponse {
        user_id: user.id.to_string(),
        username: user.username,
        email: user.email,
    }))
}

#[tracing::instrument(skip(state, request))]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.auth_service.forgot_password(&request.email).await?;
    Ok(Json(MessageResponse::new(message)))
}

#[tracing::instrument(skip(state, request))]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .auth_service
        .reset_password(&request.email, &request.otp, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new(message)))
}
