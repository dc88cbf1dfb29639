use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_error::error_from_response;
use crate::application::ports::{
    FormatSpec, FormattingProvider, ProviderCapabilities, ProviderError,
};
use crate::application::services::{PromptSource, UNTRANSCRIBABLE_MARKER, build_formatting_prompt};
use crate::domain::ContentType;
use crate::infrastructure::audio::AudioPayload;
use crate::infrastructure::observability::sanitize_prompt;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Google `generateContent`. Audio is sent inline and transcribed and
/// formatted in a single call.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("GEMINI_API_KEY is not set".to_string()))
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: GenerateResponse = response.json().await?;

        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ProviderError::InvalidResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text.trim().to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[async_trait]
impl FormattingProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            text: true,
            audio: true,
        }
    }

    fn model_for(&self, _content_type: ContentType) -> String {
        self.config.model.clone()
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn format_text(&self, content: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let prompt = build_formatting_prompt(content, spec, PromptSource::Text);

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            content = %sanitize_prompt(content),
            "Sending formatting request to Gemini"
        );

        let text = self
            .generate(vec![Part {
                text: Some(prompt),
                inline_data: None,
            }])
            .await?;

        tracing::info!(response_chars = text.len(), "Gemini formatting completed");
        Ok(text)
    }

    async fn format_audio(&self, audio: &str, spec: &FormatSpec) -> Result<String, ProviderError> {
        let payload = AudioPayload::decode(audio)?;
        let prompt = build_formatting_prompt("", spec, PromptSource::AttachedAudio);

        tracing::debug!(
            model = %self.config.model,
            bytes = payload.bytes.len(),
            mime_type = %payload.mime_type,
            "Sending audio to Gemini"
        );

        let text = self
            .generate(vec![
                Part {
                    text: Some(prompt),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: payload.mime_type.clone(),
                        data: payload.to_base64(),
                    }),
                },
            ])
            .await?;

        if text.contains(UNTRANSCRIBABLE_MARKER) {
            return Err(ProviderError::TranscriptionFailed(
                "Gemini could not transcribe the recording".to_string(),
            ));
        }

        tracing::info!(response_chars = text.len(), "Gemini audio formatting completed");
        Ok(text)
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
