use reqwest::multipart;

use super::AudioPayload;
use crate::application::ports::ProviderError;
use crate::infrastructure::llm::error_from_response;

/// OpenAI Whisper transcription over the `audio/transcriptions` endpoint.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    model: String,
    language: String,
}

impl WhisperTranscriber {
    pub fn new(client: reqwest::Client, base_url: String, model: String, language: String) -> Self {
        Self {
            client,
            base_url,
            model,
            language,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn transcribe(
        &self,
        api_key: &str,
        audio: &AudioPayload,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name())
            .mime_str(&audio.mime_type)
            .map_err(|e| ProviderError::InvalidInput(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text")
            .part("file", file_part);

        tracing::debug!(
            model = %self.model,
            bytes = audio.bytes.len(),
            mime_type = %audio.mime_type,
            "Sending audio to Whisper"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let transcript = response.text().await?;
        let transcript = transcript.trim();

        if transcript.is_empty() {
            return Err(ProviderError::TranscriptionFailed(
                "Whisper returned an empty transcript".to_string(),
            ));
        }

        tracing::info!(chars = transcript.len(), "Whisper transcription completed");
        Ok(transcript.to_string())
    }
}
