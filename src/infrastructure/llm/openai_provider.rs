use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_error::error_from_response;
use crate::application::ports::{
    FormatSpec, FormattingProvider, ProviderCapabilities, ProviderError,
};
use crate::application::services::{PromptSource, build_formatting_prompt};
use crate::domain::ContentType;
use crate::infrastructure::audio::{AudioPayload, WhisperTranscriber};
use crate::infrastructure::observability::sanitize_prompt;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub transcription_language: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4-turbo-preview".to_string(),
            transcription_model: "whisper-1".to_string(),
            transcription_language: "en".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
        }
    }
}

/// Chat completions for text; Whisper transcription followed by chat
/// formatting for audio.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
    transcriber: WhisperTranscriber,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, config: OpenAiConfig) -> Self {
        let transcriber = WhisperTranscriber::new(
            client.clone(),
            config.base_url.trim_end_matches('/').to_string(),
            config.transcription_model.clone(),
            config.transcription_language.clone(),
        );
        Self {
            client,
            config,
            transcriber,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("OPENAI_API_KEY is not set".to_string()))
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn chat(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url()))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: ChatResponse = response.json().await?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text.trim().to_string())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl FormattingProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            text: true,
            audio: true,
        }
    }

    fn model_for(&self, content_type: ContentType) -> String {
        match content_type {
            ContentType::Text => self.config.chat_model.clone(),
            ContentType::Audio => format!(
                "{} + {}",
                self.transcriber.model(),
                self.config.chat_model
            ),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn format_text(&self, content: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let prompt = build_formatting_prompt(content, spec, PromptSource::Text);

        tracing::debug!(
            model = %self.config.chat_model,
            prompt_chars = prompt.len(),
            content = %sanitize_prompt(content),
            "Sending formatting request to OpenAI"
        );

        let text = self.chat(&prompt).await?;
        tracing::info!(response_chars = text.len(), "OpenAI formatting completed");
        Ok(text)
    }

    async fn format_audio(&self, audio: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let payload = AudioPayload::decode(audio)?;

        let transcript = self.transcriber.transcribe(api_key, &payload).await?;
        tracing::debug!(transcript = %sanitize_prompt(&transcript), "Formatting transcript");

        let prompt = build_formatting_prompt(&transcript, spec, PromptSource::TranscribedAudio);
        let text = self.chat(&prompt).await?;
        tracing::info!(response_chars = text.len(), "OpenAI audio formatting completed");
        Ok(text)
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/models/{}", self.base_url(), self.config.chat_model))
            .bearer_auth(api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
