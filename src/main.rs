use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use config::settings::AppConfig;
use infrastructure::encoder::ffmpeg::FfmpegEncoder;
use infrastructure::tts::voicerss::VoiceRssClient;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    if config.tts.api_key.is_none() {
        warn!("VOICERSS_API_KEY is not set, reels will be rendered without narration");
    }

    let synthesizer = VoiceRssClient::new(config.tts.clone())
        .context("Failed to build speech synthesis client")?;
    let encoder = FfmpegEncoder::new(&config.encoder);
    let state = AppState::new(config, Arc::new(synthesizer), Arc::new(encoder));

    state.reels.ensure_root().await?;
    state.documents.ensure_root().await?;
    info!(
        "Reels under {}, documents under {}",
        state.reels.root().display(),
        state.documents.root().display()
    );

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
