use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use super::{SpeechSynthesizer, SynthesisError};
use crate::config::settings::TtsSettings;

const AUDIO_CODEC: &str = "mp3";
const AUDIO_FORMAT: &str = "22khz_16bit_mono";
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct VoiceRssClient {
    http: reqwest::Client,
    settings: TtsSettings,
}

impl VoiceRssClient {
    pub fn new(settings: TtsSettings) -> Result<Self, SynthesisError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { http, settings })
    }

    fn query(&self, key: &str, text: &str) -> Vec<(&'static str, String)> {
        vec![
            ("key", key.to_string()),
            ("src", text.to_string()),
            ("hl", self.settings.language.clone()),
            ("v", self.settings.voice.clone()),
            ("r", self.settings.rate.to_string()),
            ("c", AUDIO_CODEC.to_string()),
            ("f", AUDIO_FORMAT.to_string()),
            ("ssml", "false".to_string()),
            ("b64", "false".to_string()),
        ]
    }
}

/// Errors arrive as 200 with a text body.
fn is_audio(content_type: &str) -> bool {
    if content_type.contains("audio") {
        return true;
    }
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str())
        .unwrap_or(false)
}

fn truncate(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl SpeechSynthesizer for VoiceRssClient {
    async fn synthesize(&self, text: &str) -> Result<Bytes, SynthesisError> {
        let key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(SynthesisError::MissingApiKey)?;

        debug!(
            "Requesting speech ({} chars, voice {}, {})",
            text.chars().count(),
            self.settings.voice,
            self.settings.language
        );

        let response = self
            .http
            .get(&self.settings.endpoint)
            .query(&self.query(key, text))
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("TTS HTTP error {}: {}", status, body);
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        if !is_audio(&content_type) {
            let body = response.text().await.unwrap_or_default();
            warn!("TTS API error: {}", body);
            return Err(SynthesisError::NotAudio {
                content_type,
                body: truncate(body),
            });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyBody);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: String) -> TtsSettings {
        TtsSettings {
            endpoint,
            api_key: Some("test-key".into()),
            ..TtsSettings::default()
        }
    }

    #[tokio::test]
    async fn test_audio_response_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("key", "test-key"))
            .and(query_param("src", "Hello there"))
            .and(query_param("hl", "en-us"))
            .and(query_param("v", "Linda"))
            .and(query_param("c", "mp3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = VoiceRssClient::new(settings(server.uri())).unwrap();
        let audio = client.synthesize("Hello there").await.unwrap();
        assert_eq!(audio.as_ref(), &[0xFF, 0xFB, 0x90, 0x00]);
    }

    #[tokio::test]
    async fn test_text_body_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("ERROR: The API key is not available!"),
            )
            .mount(&server)
            .await;

        let client = VoiceRssClient::new(settings(server.uri())).unwrap();
        match client.synthesize("Hi").await {
            Err(SynthesisError::NotAudio { body, .. }) => {
                assert!(body.contains("API key is not available"))
            }
            other => panic!("expected NotAudio, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = VoiceRssClient::new(settings(server.uri())).unwrap();
        assert!(matches!(
            client.synthesize("Hi").await,
            Err(SynthesisError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_error_does_not_leak_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(vec![0xFF, 0xFB])
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = VoiceRssClient::new(TtsSettings {
            api_key: Some("secret-voice-key".into()),
            timeout_secs: 1,
            ..settings(server.uri())
        })
        .unwrap();

        let err = client.synthesize("hi").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Transport(_)));
        let message = err.to_string();
        assert!(!message.contains("secret-voice-key"), "{}", message);
        assert!(!message.contains("key="), "{}", message);
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_out() {
        let client = VoiceRssClient::new(TtsSettings::default()).unwrap();
        assert!(matches!(
            client.synthesize("Hi").await,
            Err(SynthesisError::MissingApiKey)
        ));
    }

    #[test]
    fn test_audio_content_types() {
        assert!(is_audio("audio/mpeg"));
        assert!(is_audio("application/octet-stream"));
        assert!(is_audio("application/octet-stream; charset=binary"));
        assert!(!is_audio("text/plain; charset=utf-8"));
        assert!(!is_audio(""));
    }

    #[test]
    fn test_error_body_truncation() {
        let long = "é".repeat(400);
        let out = truncate(long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= MAX_ERROR_BODY + 3);
    }
}
