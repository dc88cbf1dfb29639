use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::application::ports::ProviderError;

const DEFAULT_MIME_TYPE: &str = "audio/mp4";

/// A decoded voice note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioPayload {
    /// Accepts raw base64 or a `data:audio/<type>;base64,` URL. Raw base64 is
    /// assumed to be MP4 audio as recorded by the mobile client.
    pub fn decode(input: &str) -> Result<Self, AudioPayloadError> {
        let input = input.trim();

        let (mime_type, encoded) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| AudioPayloadError::InvalidPrefix(truncate(rest)))?;
                let mime_type = header
                    .strip_suffix(";base64")
                    .filter(|m| m.starts_with("audio/"))
                    .ok_or_else(|| AudioPayloadError::InvalidPrefix(header.to_string()))?;
                (mime_type.to_string(), data)
            }
            None => (DEFAULT_MIME_TYPE.to_string(), input),
        };

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(AudioPayloadError::Empty);
        }

        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| AudioPayloadError::InvalidBase64(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AudioPayloadError::Empty);
        }

        Ok(Self { bytes, mime_type })
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/webm" => "webm",
            "audio/ogg" => "ogg",
            "audio/x-m4a" | "audio/m4a" => "m4a",
            "audio/flac" => "flac",
            _ => "mp4",
        }
    }

    pub fn file_name(&self) -> String {
        format!("voice_note.{}", self.file_extension())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(40).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioPayloadError {
    #[error("unsupported data URL header: {0}")]
    InvalidPrefix(String),
    #[error("audio is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("audio payload is empty")]
    Empty,
}

impl From<AudioPayloadError> for ProviderError {
    fn from(e: AudioPayloadError) -> Self {
        ProviderError::InvalidInput(e.to_string())
    }
}
