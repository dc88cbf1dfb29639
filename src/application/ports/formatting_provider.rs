use async_trait::async_trait;
use chrono::NaiveDate;

use super::ProviderError;
use crate::domain::ContentType;

/// What a provider is asked to produce: the template skeleton, the
/// formatting instruction and the date the output should be stamped with.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub template: String,
    pub instruction: Option<String>,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub text: bool,
    pub audio: bool,
}

impl ProviderCapabilities {
    pub fn supports(&self, content_type: ContentType) -> bool {
        match content_type {
            ContentType::Text => self.text,
            ContentType::Audio => self.audio,
        }
    }
}

#[async_trait]
pub trait FormattingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Model identifier recorded in processing metadata.
    fn model_for(&self, content_type: ContentType) -> String;

    /// False when credentials are absent. An unconfigured provider must not
    /// touch the network.
    fn is_configured(&self) -> bool;

    async fn format_text(&self, content: &str, spec: &FormatSpec) -> Result<String, ProviderError>;

    /// `audio` is base64, optionally prefixed with a `data:audio/...;base64,` header.
    async fn format_audio(&self, audio: &str, spec: &FormatSpec) -> Result<String, ProviderError>;

    /// Cheap authenticated liveness call, classified like any other request:
    /// a rejected key comes back as `AuthenticationFailed`, not as an outage.
    async fn probe(&self) -> Result<(), ProviderError>;

    /// Boolean view of [`probe`](Self::probe). Never fails; the reason is logged.
    async fn check_availability(&self) -> bool {
        match self.probe().await {
            Ok(()) => true,
            Err(error) => {
                log_probe_failure(self.name(), &error);
                false
            }
        }
    }
}

fn log_probe_failure(provider: &'static str, error: &ProviderError) {
    match error {
        ProviderError::AuthenticationFailed(_) | ProviderError::NotConfigured(_) => {
            tracing::error!(provider, error = %error, "Provider rejected credentials");
        }
        ProviderError::QuotaExceeded(_) | ProviderError::RateLimited(_) => {
            tracing::warn!(provider, error = %error, "Provider quota or rate limit reached");
        }
        ProviderError::ServerError { .. }
        | ProviderError::Network(_)
        | ProviderError::Timeout
        | ProviderError::Unavailable => {
            tracing::warn!(provider, error = %error, "Provider temporarily unavailable");
        }
        other => {
            tracing::warn!(provider, error = %other, "Provider probe failed");
        }
    }
}
