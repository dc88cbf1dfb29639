mod audio_payload;
mod whisper_transcriber;

pub use audio_payload::{AudioPayload, AudioPayloadError};
pub use whisper_transcriber::WhisperTranscriber;
