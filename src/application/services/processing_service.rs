use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::application::ports::{
    FormatSpec, FormattingProvider, ProcessedContentRepository, ProviderError, RepositoryError,
    TemplateRepository,
};
use crate::domain::{
    ContentType, ProcessedContent, ProcessedContentView, ProcessingMetadata, TemplateId, UserId,
    find_leaked_placeholders,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): `base_delay * 2^(attempt-1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Providers routed per content type.
#[derive(Clone)]
pub struct ProviderRoutes {
    pub text: Arc<dyn FormattingProvider>,
    pub audio: Arc<dyn FormattingProvider>,
}

impl ProviderRoutes {
    pub fn for_content(&self, content_type: ContentType) -> &Arc<dyn FormattingProvider> {
        match content_type {
            ContentType::Text => &self.text,
            ContentType::Audio => &self.audio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub template_id: TemplateId,
    pub content_type: ContentType,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingState {
    Pending,
    AvailabilityCheck { attempt: u32 },
    Processing { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Succeeded { output: String, attempts: u32 },
    Failed { error: ProviderError, attempts: u32 },
}

impl ProcessingState {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingState::Pending => "pending",
            ProcessingState::AvailabilityCheck { .. } => "availability_check",
            ProcessingState::Processing { .. } => "processing",
            ProcessingState::Backoff { .. } => "backoff",
            ProcessingState::Succeeded { .. } => "succeeded",
            ProcessingState::Failed { .. } => "failed",
        }
    }
}

pub struct ProcessingService {
    templates: Arc<dyn TemplateRepository>,
    contents: Arc<dyn ProcessedContentRepository>,
    providers: ProviderRoutes,
    retry_policy: RetryPolicy,
    redact_audio_at_rest: bool,
}

impl ProcessingService {
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        contents: Arc<dyn ProcessedContentRepository>,
        providers: ProviderRoutes,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            templates,
            contents,
            providers,
            retry_policy,
            redact_audio_at_rest: false,
        }
    }

    /// Store a short marker instead of the raw base64 recording.
    pub fn with_audio_redaction(mut self, enabled: bool) -> Self {
        self.redact_audio_at_rest = enabled;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    #[instrument(
        skip(self, request, cancel),
        fields(
            user_id = %user_id,
            template_id = %request.template_id,
            content_type = %request.content_type
        )
    )]
    pub async fn process(
        &self,
        user_id: UserId,
        request: ProcessRequest,
        cancel: &CancellationToken,
    ) -> Result<ProcessedContentView, ProcessingError> {
        let started = Instant::now();
        let submission_date = Utc::now();

        if request.content.trim().is_empty() {
            return Err(ProcessingError::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }

        let template = self
            .templates
            .find_active(request.template_id, user_id)
            .await?
            .ok_or(ProcessingError::TemplateNotFound(request.template_id))?;

        let provider = Arc::clone(self.providers.for_content(request.content_type));

        if !provider.is_configured() {
            warn!(
                provider = provider.name(),
                "Provider has no credentials configured"
            );
            return Err(ProcessingError::Configuration(format!(
                "{} provider is not configured",
                provider.name()
            )));
        }

        let spec = FormatSpec {
            template: template.format.clone(),
            instruction: template.instruction.clone(),
            today: submission_date.date_naive(),
        };

        let output = self
            .run_with_retry(provider.as_ref(), &request, &spec, cancel)
            .await?;

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let placeholder_warnings = find_leaked_placeholders(&output, &template.format);
        if !placeholder_warnings.is_empty() {
            warn!(
                provider = provider.name(),
                placeholders = ?placeholder_warnings,
                "Formatted output still contains template placeholders"
            );
        }

        let original_content = match request.content_type {
            ContentType::Audio if self.redact_audio_at_rest => {
                format!("[audio redacted: {} base64 chars]", request.content.len())
            }
            _ => request.content,
        };

        let record = ProcessedContent::new(
            user_id,
            template.id,
            request.content_type,
            original_content,
            output,
            ProcessingMetadata {
                submission_date,
                processing_time_ms,
                ai_model: provider.model_for(request.content_type),
                placeholder_warnings,
            },
        );

        self.contents.create(&record).await?;

        info!(
            content_id = %record.id,
            provider = provider.name(),
            processing_time_ms,
            "Content processed"
        );

        self.contents
            .find_active(record.id, user_id)
            .await?
            .ok_or_else(|| {
                ProcessingError::Repository(RepositoryError::NotFound(record.id.to_string()))
            })
    }

    async fn run_with_retry(
        &self,
        provider: &dyn FormattingProvider,
        request: &ProcessRequest,
        spec: &FormatSpec,
        cancel: &CancellationToken,
    ) -> Result<String, ProcessingError> {
        let mut state = ProcessingState::Pending;

        loop {
            debug!(state = state.name(), provider = provider.name(), "Processing state");

            state = match state {
                ProcessingState::Pending => ProcessingState::AvailabilityCheck { attempt: 1 },

                ProcessingState::AvailabilityCheck { attempt } => {
                    let probe = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ProcessingError::Cancelled),
                        probe = provider.probe() => probe,
                    };

                    match probe {
                        Ok(()) => ProcessingState::Processing { attempt },
                        Err(error) => self.classify_attempt(provider, attempt, error),
                    }
                }

                ProcessingState::Processing { attempt } => {
                    let call = async {
                        match request.content_type {
                            ContentType::Text => provider.format_text(&request.content, spec).await,
                            ContentType::Audio => {
                                provider.format_audio(&request.content, spec).await
                            }
                        }
                    };

                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ProcessingError::Cancelled),
                        result = call => result,
                    };

                    match result {
                        Ok(output) if !output.trim().is_empty() => ProcessingState::Succeeded {
                            output: output.trim().to_string(),
                            attempts: attempt,
                        },
                        Ok(_) => self.after_failure(attempt, ProviderError::EmptyResponse),
                        Err(error) => self.classify_attempt(provider, attempt, error),
                    }
                }

                ProcessingState::Backoff { attempt, delay } => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ProcessingError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    ProcessingState::AvailabilityCheck {
                        attempt: attempt + 1,
                    }
                }

                ProcessingState::Succeeded { output, attempts } => {
                    debug!(attempts, "Provider call succeeded");
                    return Ok(output);
                }

                ProcessingState::Failed { error, attempts } => {
                    return Err(classify_failure(provider.name(), error, attempts));
                }
            };
        }
    }

    /// Non-retryable failures (rejected credentials, bad input) end the run
    /// on the attempt that saw them, whether from the probe or the call.
    fn classify_attempt(
        &self,
        provider: &dyn FormattingProvider,
        attempt: u32,
        error: ProviderError,
    ) -> ProcessingState {
        if error.is_retryable() {
            return self.after_failure(attempt, error);
        }

        warn!(
            provider = provider.name(),
            attempt,
            error_kind = error.kind(),
            error = %error,
            "Non-retryable provider failure"
        );
        ProcessingState::Failed {
            error,
            attempts: attempt,
        }
    }

    fn after_failure(&self, attempt: u32, error: ProviderError) -> ProcessingState {
        if attempt >= self.retry_policy.max_attempts {
            warn!(
                attempt,
                error_kind = error.kind(),
                error = %error,
                "Provider retries exhausted"
            );
            return ProcessingState::Failed {
                error,
                attempts: attempt,
            };
        }

        let delay = self.retry_policy.delay_for(attempt);
        warn!(
            attempt,
            max_attempts = self.retry_policy.max_attempts,
            delay_ms = delay.as_millis(),
            error_kind = error.kind(),
            error = %error,
            "Provider attempt failed, backing off"
        );
        ProcessingState::Backoff { attempt, delay }
    }
}

fn classify_failure(provider: &str, error: ProviderError, attempts: u32) -> ProcessingError {
    match error {
        ProviderError::InvalidInput(message) => ProcessingError::InvalidInput(message),
        error if error.is_configuration() || matches!(error, ProviderError::UnsupportedContent(_)) => {
            ProcessingError::Configuration(format!("{}: {}", provider, error))
        }
        error if error.is_outage() => ProcessingError::ServiceUnavailable {
            attempts,
            source: error,
        },
        error => ProcessingError::ProcessingFailed {
            attempts,
            source: error,
        },
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("service unavailable after {attempts} attempt(s): {source}")]
    ServiceUnavailable { attempts: u32, source: ProviderError },
    #[error("processing failed after {attempts} attempt(s): {source}")]
    ProcessingFailed { attempts: u32, source: ProviderError },
    #[error("processing cancelled")]
    Cancelled,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
