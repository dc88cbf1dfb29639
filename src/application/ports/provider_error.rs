use crate::domain::ContentType;

/// Structured failure of a formatting provider, built from HTTP status and
/// vendor error codes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("request rejected {status}: {body}")]
    RequestRejected { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("provider unavailable")]
    Unavailable,
    #[error("empty response from provider")]
    EmptyResponse,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("unsupported content type: {0}")]
    UnsupportedContent(ContentType),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ProviderError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::NotConfigured(_)
                | Self::AuthenticationFailed(_)
                | Self::RequestRejected { .. }
                | Self::UnsupportedContent(_)
                | Self::InvalidInput(_)
        )
    }

    /// Failures caused by missing or rejected credentials.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured(_) | Self::AuthenticationFailed(_))
    }

    /// Failures caused by the vendor being unreachable or throttling.
    pub fn is_outage(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded(_)
                | Self::RateLimited(_)
                | Self::ServerError { .. }
                | Self::Network(_)
                | Self::Timeout
                | Self::Unavailable
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::RateLimited(_) => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::RequestRejected { .. } => "request_rejected",
            Self::Network(_) => "network_error",
            Self::Timeout => "timeout",
            Self::Unavailable => "unavailable",
            Self::EmptyResponse => "empty_response",
            Self::InvalidResponse(_) => "invalid_response",
            Self::TranscriptionFailed(_) => "transcription_failed",
            Self::UnsupportedContent(_) => "unsupported_content",
            Self::InvalidInput(_) => "invalid_input",
        }
    }

    /// Classifies a non-success HTTP response. Vendor error codes in the body
    /// (`invalid_api_key`, `insufficient_quota`, `rate_limit_exceeded`) take
    /// precedence over the status code.
    pub fn from_status(status: u16, body: String) -> Self {
        let code = vendor_error_code(&body);
        match code.as_deref() {
            Some("invalid_api_key")
            | Some("authentication_error")
            | Some("permission_error")
            | Some("API_KEY_INVALID") => {
                return Self::AuthenticationFailed(body);
            }
            Some("insufficient_quota") | Some("RESOURCE_EXHAUSTED") => {
                return Self::QuotaExceeded(body);
            }
            Some("rate_limit_exceeded") | Some("rate_limit_error") => {
                return Self::RateLimited(body);
            }
            Some("overloaded_error") => return Self::ServerError { status, body },
            _ => {}
        }

        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            408 => Self::Timeout,
            429 => Self::RateLimited(body),
            500..=599 => Self::ServerError { status, body },
            _ => Self::RequestRejected { status, body },
        }
    }
}

/// Extracts `error.code`, `error.type`, `error.status` or a detail `reason`
/// from the JSON error envelopes used by OpenAI, Anthropic and Gemini.
fn vendor_error_code(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let reasons = error
        .get("details")
        .and_then(|d| d.as_array())
        .into_iter()
        .flatten()
        .filter_map(|detail| detail.get("reason").and_then(|r| r.as_str()));

    ["code", "type", "status"]
        .iter()
        .filter_map(|key| error.get(*key).and_then(|v| v.as_str()))
        .chain(reasons)
        .find(|code| {
            matches!(
                *code,
                "invalid_api_key"
                    | "authentication_error"
                    | "permission_error"
                    | "API_KEY_INVALID"
                    | "insufficient_quota"
                    | "RESOURCE_EXHAUSTED"
                    | "rate_limit_exceeded"
                    | "rate_limit_error"
                    | "overloaded_error"
            )
        })
        .map(String::from)
}
