use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::common::error::JobResult;
use crate::config::settings::{AppConfig, EncoderSettings, TtsSettings};
use crate::infrastructure::encoder::{EncodeOutput, EncodeRequest, VideoEncoder};
use crate::infrastructure::tts::{SpeechSynthesizer, SynthesisError};
use crate::state::AppState;

pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3";

pub struct FakeSynthesizer {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeSynthesizer {
    pub fn working() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Bytes, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SynthesisError::EmptyBody)
        } else {
            Ok(Bytes::from_static(FAKE_AUDIO))
        }
    }
}

pub struct FakeEncoder {
    requests: Mutex<Vec<EncodeRequest>>,
    write_output: bool,
}

impl FakeEncoder {
    pub fn working() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            write_output: true,
        }
    }

    pub fn silent_failure() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            write_output: false,
        }
    }

    pub fn requests(&self) -> Vec<EncodeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoEncoder for FakeEncoder {
    async fn encode(&self, request: &EncodeRequest) -> JobResult<EncodeOutput> {
        self.requests.lock().unwrap().push(request.clone());
        if self.write_output {
            tokio::fs::write(&request.output, b"\x00\x00\x00\x18ftypmp42")
                .await
                .unwrap();
        }
        Ok(EncodeOutput {
            output: request.output.clone(),
            exit_code: Some(0),
            log: String::new(),
        })
    }
}

pub fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        server_port: 0,
        reels_root: root.join("user_uploads"),
        documents_root: root.join("pdf_data"),
        image_duration_secs: 1.0,
        max_upload_bytes: 10 * 1024 * 1024,
        tts: TtsSettings::default(),
        encoder: EncoderSettings::default(),
    }
}

pub fn test_state(
    root: &Path,
    synthesizer: Arc<FakeSynthesizer>,
    encoder: Arc<FakeEncoder>,
) -> AppState {
    AppState::new(test_config(root), synthesizer, encoder)
}

pub fn pdf_bytes(pages: usize) -> Vec<u8> {
    let mut doc = oxidize_pdf::Document::new();
    for _ in 0..pages {
        doc.add_page(oxidize_pdf::Page::a4());
    }
    let mut bytes = Vec::new();
    doc.write(&mut bytes).unwrap();
    bytes
}
