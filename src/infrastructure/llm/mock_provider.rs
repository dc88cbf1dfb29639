use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    FormatSpec, FormattingProvider, ProviderCapabilities, ProviderError,
};
use crate::application::services::format_prompt_date;
use crate::domain::ContentType;
use crate::infrastructure::audio::AudioPayload;

/// Offline provider for scaffold mode. Echoes the content under a dated
/// heading after an optional delay.
pub struct MockFormattingProvider {
    delay: Duration,
}

impl MockFormattingProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockFormattingProvider {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl FormattingProvider for MockFormattingProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            text: true,
            audio: true,
        }
    }

    fn model_for(&self, _content_type: ContentType) -> String {
        "mock-formatter".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn format_text(&self, content: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        self.simulate_latency().await;
        Ok(format!(
            "## Notes\n\n**Date:** {}\n\n{}",
            format_prompt_date(spec.today),
            content.trim()
        ))
    }

    async fn format_audio(&self, audio: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let payload = AudioPayload::decode(audio)?;
        self.simulate_latency().await;
        Ok(format!(
            "## Voice note\n\n**Date:** {}\n\nRecorded {} bytes of {}.",
            format_prompt_date(spec.today),
            payload.bytes.len(),
            payload.mime_type
        ))
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
