use std::path::PathBuf;

use serde::Deserialize;
use crate::config::env::{self, EnvKey};

const DEFAULT_IMAGE_DURATION_SECS: f64 = 1.0;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub reels_root: PathBuf,
    pub documents_root: PathBuf,
    pub image_duration_secs: f64,
    pub max_upload_bytes: usize,
    pub tts: TtsSettings,
    pub encoder: EncoderSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TtsSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub language: String,
    pub voice: String,
    /// Speech rate, -10 to 10.
    pub rate: i8,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EncoderSettings {
    pub binary: String,
    pub timeout_secs: u64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://api.voicerss.org/".to_string(),
            api_key: None,
            language: "en-us".to_string(),
            voice: "Linda".to_string(),
            rate: 0,
            timeout_secs: 30,
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            timeout_secs: 300,
            width: 1080,
            height: 1920,
            fps: 30,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        let tts_defaults = TtsSettings::default();
        let encoder_defaults = EncoderSettings::default();

        let api_key = env::get(EnvKey::TtsApiKey)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let image_duration_secs =
            match env::get_parsed(EnvKey::ImageDurationSecs, DEFAULT_IMAGE_DURATION_SECS) {
                secs if secs.is_finite() && secs > 0.0 => secs,
                _ => DEFAULT_IMAGE_DURATION_SECS,
            };

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            reels_root: PathBuf::from(env::get_or(EnvKey::ReelsRoot, "user_uploads")),
            documents_root: PathBuf::from(env::get_or(EnvKey::DocumentsRoot, "pdf_data")),
            image_duration_secs,
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            tts: TtsSettings {
                endpoint: env::get_or(EnvKey::TtsUrl, &tts_defaults.endpoint),
                api_key,
                language: env::get_or(EnvKey::TtsLanguage, &tts_defaults.language),
                voice: env::get_or(EnvKey::TtsVoice, &tts_defaults.voice),
                rate: env::get_parsed(EnvKey::TtsRate, tts_defaults.rate).clamp(-10, 10),
                timeout_secs: env::get_parsed(EnvKey::TtsTimeoutSecs, tts_defaults.timeout_secs),
            },
            encoder: EncoderSettings {
                binary: env::get_or(EnvKey::FfmpegBin, &encoder_defaults.binary),
                timeout_secs: env::get_parsed(EnvKey::EncodeTimeoutSecs, encoder_defaults.timeout_secs),
                width: env::get_parsed(EnvKey::ReelWidth, encoder_defaults.width),
                height: env::get_parsed(EnvKey::ReelHeight, encoder_defaults.height),
                fps: env::get_parsed(EnvKey::ReelFps, encoder_defaults.fps),
            },
        }
    }
}
