use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::TokenError;
use crate::application::services::{AuthError, ContentError, ProcessingError, TemplateError};

const CONFIGURATION_MESSAGE: &str =
    "AI service is not configured correctly. Please contact the administrator.";
const UNAVAILABLE_MESSAGE: &str = "AI service is temporarily unavailable. Please try again later.";
const PROCESSING_FAILED_MESSAGE: &str = "Failed to process content. Please try again.";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Everything a handler can fail with, already reduced to what the client may see.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("configuration error")]
    Configuration,
    #[error("{0}")]
    ProcessingFailed(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ServiceUnavailable(_) | ApiError::Configuration => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::ProcessingFailed(_) => StatusCode::BAD_GATEWAY,
            // nginx's "client closed request"
            ApiError::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Configuration => "configuration_error",
            ApiError::ProcessingFailed(_) => "processing_failed",
            ApiError::Cancelled => "cancelled",
            ApiError::Internal => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Configuration => CONFIGURATION_MESSAGE.to_string(),
            ApiError::Internal => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let field = match &self {
            ApiError::Validation { field, .. } => field.clone(),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                message: self.message(),
                r#type: self.kind(),
                field,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<TemplateError> for ApiError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Validation { field, message } => ApiError::validation(field, message),
            TemplateError::NotFound(_) => ApiError::NotFound("User format not found".to_string()),
            TemplateError::Repository(e) => {
                tracing::error!(error = %e, "Template repository failure");
                ApiError::Internal
            }
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Validation { field, message } => ApiError::validation(field, message),
            ContentError::NotFound(_) => {
                ApiError::NotFound("Processed content not found".to_string())
            }
            ContentError::TemplateNotFound(_) => {
                ApiError::NotFound("User format not found".to_string())
            }
            ContentError::Repository(e) => {
                tracing::error!(error = %e, "Content repository failure");
                ApiError::Internal
            }
        }
    }
}

impl From<ProcessingError> for ApiError {
    fn from(e: ProcessingError) -> Self {
        match e {
            ProcessingError::TemplateNotFound(_) => {
                ApiError::NotFound("User format not found".to_string())
            }
            ProcessingError::InvalidInput(message) => ApiError::validation("content", message),
            ProcessingError::Configuration(detail) => {
                tracing::error!(detail = %detail, "Formatting provider misconfigured");
                ApiError::Configuration
            }
            ProcessingError::ServiceUnavailable { attempts, source } => {
                tracing::error!(attempts, error_kind = source.kind(), error = %source, "Formatting provider unavailable");
                ApiError::ServiceUnavailable(UNAVAILABLE_MESSAGE.to_string())
            }
            ProcessingError::ProcessingFailed { attempts, source } => {
                tracing::error!(attempts, error_kind = source.kind(), error = %source, "Formatting failed");
                ApiError::ProcessingFailed(PROCESSING_FAILED_MESSAGE.to_string())
            }
            ProcessingError::Cancelled => ApiError::Cancelled,
            ProcessingError::Repository(e) => {
                tracing::error!(error = %e, "Content repository failure");
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation { field, message } => ApiError::validation(field, message),
            AuthError::Conflict => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            AuthError::Unauthorized => ApiError::Unauthorized("Unauthorized".to_string()),
            AuthError::InvalidOtp(rejection) => ApiError::validation("otp", rejection.message()),
            AuthError::EmailDelivery(e) => {
                tracing::error!(error = %e, "Email delivery failed");
                ApiError::ServiceUnavailable(
                    "Failed to send email. Please try again later.".to_string(),
                )
            }
            AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Repository(_) => {
                tracing::error!(error = %e, "Authentication failure");
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid(_) => ApiError::Unauthorized("Invalid token".to_string()),
            TokenError::EncodingFailed(_) => {
                tracing::error!(error = %e, "Token encoding failed");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}
