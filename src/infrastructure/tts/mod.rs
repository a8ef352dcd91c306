pub mod voicerss;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("TTS API key is not configured")]
    MissingApiKey,

    #[error("TTS request failed: {0}")]
    Transport(reqwest::Error),

    #[error("TTS service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("TTS service returned non-audio content ({content_type}): {body}")]
    NotAudio { content_type: String, body: String },

    #[error("TTS service returned an empty body")]
    EmptyBody,
}

// The request URL carries the API key in its query string.
impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        SynthesisError::Transport(e.without_url())
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Bytes, SynthesisError>;
}
