pub mod ffmpeg;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::common::error::JobResult;
use crate::config::settings::EncoderSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub pixel_format: String,
}

impl EncodeParams {
    pub fn from_settings(settings: &EncoderSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
            ..Self::default()
        }
    }

    pub fn scale_pad_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black",
            w = self.width,
            h = self.height
        )
    }
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub manifest: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
    pub params: EncodeParams,
}

#[derive(Debug, Clone)]
pub struct EncodeOutput {
    pub output: PathBuf,
    pub exit_code: Option<i32>,
    pub log: String,
}

#[async_trait]
pub trait VideoEncoder: Send + Sync {
    async fn encode(&self, request: &EncodeRequest) -> JobResult<EncodeOutput>;
}
