use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    ReelsRoot,
    DocumentsRoot,
    TtsUrl,
    TtsApiKey,
    TtsLanguage,
    TtsVoice,
    TtsRate,
    TtsTimeoutSecs,
    FfmpegBin,
    EncodeTimeoutSecs,
    ImageDurationSecs,
    ReelWidth,
    ReelHeight,
    ReelFps,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::ReelsRoot => "REELS_UPLOAD_ROOT",
            EnvKey::DocumentsRoot => "DOCUMENTS_UPLOAD_ROOT",
            EnvKey::TtsUrl => "VOICERSS_URL",
            EnvKey::TtsApiKey => "VOICERSS_API_KEY",
            EnvKey::TtsLanguage => "TTS_LANGUAGE",
            EnvKey::TtsVoice => "TTS_VOICE",
            EnvKey::TtsRate => "TTS_RATE",
            EnvKey::TtsTimeoutSecs => "TTS_TIMEOUT_SECS",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::EncodeTimeoutSecs => "ENCODE_TIMEOUT_SECS",
            EnvKey::ImageDurationSecs => "REEL_IMAGE_DURATION_SECS",
            EnvKey::ReelWidth => "REEL_WIDTH",
            EnvKey::ReelHeight => "REEL_HEIGHT",
            EnvKey::ReelFps => "REEL_FPS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
