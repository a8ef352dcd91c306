use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::encoder::{EncodeParams, VideoEncoder};
use crate::infrastructure::storage::jobs::JobStore;
use crate::infrastructure::tts::SpeechSynthesizer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub reels: JobStore,
    pub documents: JobStore,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub encoder: Arc<dyn VideoEncoder>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        encoder: Arc<dyn VideoEncoder>,
    ) -> Self {
        Self {
            reels: JobStore::new(config.reels_root.clone()),
            documents: JobStore::new(config.documents_root.clone()),
            config,
            synthesizer,
            encoder,
        }
    }

    pub fn encode_params(&self) -> EncodeParams {
        EncodeParams::from_settings(&self.config.encoder)
    }
}
