use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{EncodeOutput, EncodeRequest, VideoEncoder};
use crate::common::error::{JobError, JobResult};
use crate::config::settings::EncoderSettings;

const LOG_TAIL_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<(Vec<String>, PathBuf)>,
    output_args: Vec<String>,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.into(),
        }
    }

    pub fn input<I, S>(mut self, options: I, path: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs
            .push((options.into_iter().map(Into::into).collect(), path.into()));
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        for (options, path) in &self.inputs {
            args.extend(options.iter().cloned());
            args.push("-i".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }

    pub fn for_request(request: &EncodeRequest) -> Self {
        let params = &request.params;
        let mut cmd = Self::new(&request.output)
            .input(["-f", "concat", "-safe", "0"], &request.manifest);

        if let Some(audio) = &request.audio {
            cmd = cmd.input(Vec::<String>::new(), audio);
        }

        cmd = cmd
            .video_filter(params.scale_pad_filter())
            .video_codec(&params.video_codec);

        if request.audio.is_some() {
            cmd = cmd.audio_codec(&params.audio_codec).output_arg("-shortest");
        }

        cmd.output_arg("-r")
            .output_arg(params.fps.to_string())
            .output_arg("-pix_fmt")
            .output_arg(&params.pixel_format)
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: String,
    timeout_secs: u64,
}

impl FfmpegEncoder {
    pub fn new(settings: &EncoderSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

fn tail(log: &[u8]) -> String {
    let start = log.len().saturating_sub(LOG_TAIL_BYTES);
    String::from_utf8_lossy(&log[start..]).trim().to_string()
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(&self, request: &EncodeRequest) -> JobResult<EncodeOutput> {
        let args = FfmpegCommand::for_request(request).build_args();
        debug!("Running encoder: {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!("Failed to spawn {}: {}", self.binary, e);
                JobError::EncoderNotFound(self.binary.clone())
            })?;

        // Drain stderr concurrently so a chatty encoder never blocks on a full pipe.
        let mut stderr = child.stderr.take();
        let log_reader = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(stderr) = stderr.as_mut() {
                let _ = stderr.read_to_end(&mut buf).await;
            }
            buf
        });

        let status = match tokio::time::timeout(Duration::from_secs(self.timeout_secs), child.wait()).await {
            Ok(status) => status.map_err(|e| JobError::fs(&request.output, e))?,
            Err(_) => {
                warn!("Encoder timed out after {} seconds, killing process", self.timeout_secs);
                let _ = child.kill().await;
                log_reader.abort();
                return Err(JobError::EncoderTimeout(self.timeout_secs));
            }
        };

        let log = tail(&log_reader.await.unwrap_or_default());

        if !status.success() {
            return Err(JobError::EncoderFailed {
                exit_code: status.code(),
                stderr: log,
            });
        }

        info!("Encoder finished: {}", request.output.display());
        Ok(EncodeOutput {
            output: request.output.clone(),
            exit_code: status.code(),
            log,
        })
    }
}
