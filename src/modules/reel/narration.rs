use tokio::fs;
use tracing::{info, warn};

use super::model::NarrationOutcome;
use crate::common::error::{JobError, JobResult};
use crate::infrastructure::storage::jobs::{JobStore, AUDIO_FILE};
use crate::infrastructure::tts::SpeechSynthesizer;

/// Synthesis problems are an outcome, not an error.
pub async fn narrate(
    store: &JobStore,
    synthesizer: &dyn SpeechSynthesizer,
    token: &str,
) -> JobResult<NarrationOutcome> {
    if store.has_artifact(token, AUDIO_FILE).await? {
        info!("Audio already present for {}, skipping synthesis", token);
        return Ok(NarrationOutcome::Reused);
    }

    let Some(text) = store.read_description(token).await? else {
        info!("No description for {}, reel will be silent", token);
        return Ok(NarrationOutcome::Skipped);
    };

    info!("Generating audio for {} ({} chars)", token, text.chars().count());

    let audio = match synthesizer.synthesize(&text).await {
        Ok(audio) => audio,
        Err(e) => {
            warn!("Narration failed for {}: {}", token, e);
            return Ok(NarrationOutcome::Failed {
                reason: e.to_string(),
            });
        }
    };

    let path = store.artifact_path(token, AUDIO_FILE)?;
    let partial = path.with_extension("mp3.part");
    fs::write(&partial, &audio)
        .await
        .map_err(|e| JobError::fs(&partial, e))?;
    fs::rename(&partial, &path)
        .await
        .map_err(|e| JobError::fs(&path, e))?;

    info!("{}: audio saved ({} bytes)", path.display(), audio.len());
    Ok(NarrationOutcome::Generated { bytes: audio.len() })
}
