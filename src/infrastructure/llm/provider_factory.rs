use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::{
    ClaudeConfig, ClaudeProvider, GeminiConfig, GeminiProvider, MockFormattingProvider,
    OpenAiConfig, OpenAiProvider,
};
use crate::application::ports::{FormattingProvider, ProviderError};
use crate::application::services::ProviderRoutes;
use crate::domain::ContentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Claude,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderConfigs {
    pub request_timeout: Duration,
    pub mock_delay: Duration,
    pub anthropic: ClaudeConfig,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create(
        kind: ProviderKind,
        client: &reqwest::Client,
        configs: &ProviderConfigs,
    ) -> Arc<dyn FormattingProvider> {
        match kind {
            ProviderKind::Claude => Arc::new(ClaudeProvider::new(
                client.clone(),
                configs.anthropic.clone(),
            )),
            ProviderKind::OpenAi => {
                Arc::new(OpenAiProvider::new(client.clone(), configs.openai.clone()))
            }
            ProviderKind::Gemini => {
                Arc::new(GeminiProvider::new(client.clone(), configs.gemini.clone()))
            }
            ProviderKind::Mock => Arc::new(MockFormattingProvider::new(configs.mock_delay)),
        }
    }

    /// Builds the per-content-type routing. Fails when a provider is routed a
    /// content type it cannot handle.
    pub fn routes(
        text: ProviderKind,
        audio: ProviderKind,
        configs: &ProviderConfigs,
    ) -> Result<ProviderRoutes, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if !configs.request_timeout.is_zero() {
            builder = builder.timeout(configs.request_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("http client: {}", e)))?;

        let text_provider = Self::create(text, &client, configs);
        let audio_provider = Self::create(audio, &client, configs);

        for (provider, content_type) in [
            (&text_provider, ContentType::Text),
            (&audio_provider, ContentType::Audio),
        ] {
            if !provider.capabilities().supports(content_type) {
                return Err(ProviderError::UnsupportedContent(content_type));
            }
            if !provider.is_configured() {
                tracing::warn!(
                    provider = provider.name(),
                    content_type = %content_type,
                    "Provider has no credentials; requests will fail with a configuration error"
                );
            }
        }

        tracing::info!(
            text_provider = text_provider.name(),
            audio_provider = audio_provider.name(),
            "Formatting providers configured"
        );

        Ok(ProviderRoutes {
            text: text_provider,
            audio: audio_provider,
        })
    }
}
