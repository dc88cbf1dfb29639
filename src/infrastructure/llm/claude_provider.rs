use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_error::error_from_response;
use crate::application::ports::{
    FormatSpec, FormattingProvider, ProviderCapabilities, ProviderError,
};
use crate::application::services::{PromptSource, build_formatting_prompt};
use crate::domain::ContentType;
use crate::infrastructure::observability::sanitize_prompt;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Anthropic Messages API. Text only.
pub struct ClaudeProvider {
    client: reqwest::Client,
    config: ClaudeConfig,
}

impl ClaudeProvider {
    pub fn new(client: reqwest::Client, config: ClaudeConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("ANTHROPIC_API_KEY is not set".to_string()))
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[async_trait]
impl FormattingProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            text: true,
            audio: false,
        }
    }

    fn model_for(&self, _content_type: ContentType) -> String {
        self.config.model.clone()
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn format_text(&self, content: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let prompt = build_formatting_prompt(content, spec, PromptSource::Text);

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            content = %sanitize_prompt(content),
            "Sending formatting request to Claude"
        );

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![RequestMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url()))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: MessagesResponse = response.json().await?;

        let block = body
            .content
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if block.kind != "text" {
            return Err(ProviderError::InvalidResponse(format!(
                "unexpected content block type: {}",
                block.kind
            )));
        }

        let text = block.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        tracing::info!(response_chars = text.len(), "Claude formatting completed");
        Ok(text.trim().to_string())
    }

    async fn format_audio(&self, _audio: &str, _spec: &FormatSpec) -> Result<String, ProviderError> {
        Err(ProviderError::UnsupportedContent(ContentType::Audio))
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/v1/models/{}", self.base_url(), self.config.model))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
