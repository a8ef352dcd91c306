use tokio::fs;
use tracing::{info, warn};

use super::manifest;
use crate::common::error::{JobError, JobResult};
use crate::infrastructure::encoder::{EncodeOutput, EncodeParams, EncodeRequest, VideoEncoder};
use crate::infrastructure::storage::jobs::{
    is_nonempty_file, JobStore, AUDIO_FILE, MANIFEST_FILE, OUTPUT_FILE,
};

pub async fn compose(
    store: &JobStore,
    encoder: &dyn VideoEncoder,
    params: &EncodeParams,
    token: &str,
) -> JobResult<EncodeOutput> {
    let manifest_path = store.artifact_path(token, MANIFEST_FILE)?;
    let entries = manifest::read(&manifest_path).await?;
    if entries.is_empty() {
        return Err(JobError::NoFiles);
    }

    for entry in &entries {
        let exists = fs::metadata(&entry.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !exists {
            warn!("Manifest for {} references missing image {}", token, entry.path.display());
            return Err(JobError::MissingImage(entry.path.clone()));
        }
    }

    let audio = if store.has_artifact(token, AUDIO_FILE).await? {
        Some(store.artifact_path(token, AUDIO_FILE)?)
    } else {
        None
    };

    let output = store.artifact_path(token, OUTPUT_FILE)?;
    match fs::remove_file(&output).await {
        Ok(()) => info!("Removed previous output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(JobError::fs(&output, e)),
    }

    let request = EncodeRequest {
        manifest: manifest_path,
        audio,
        output: output.clone(),
        params: params.clone(),
    };

    info!(
        "Composing reel {} from {} images ({})",
        token,
        entries.len(),
        if request.audio.is_some() { "with narration" } else { "silent" }
    );

    let result = encoder.encode(&request).await?;

    if !is_nonempty_file(&output).await {
        return Err(JobError::MissingOutput(output));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEncoder;

    async fn job_with_images(images: &[&str]) -> (tempfile::TempDir, JobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path());
        let job_dir = store.create("job").await.unwrap();
        let mut names = Vec::new();
        for image in images {
            store.save_upload("job", image, b"img").await.unwrap();
            names.push(image.to_string());
        }
        let entries = manifest::build(&job_dir, &names, 1.0).unwrap();
        manifest::write(&store.artifact_path("job", MANIFEST_FILE).unwrap(), &entries)
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_composes_when_all_images_exist() {
        let (_tmp, store) = job_with_images(&["a.png", "b.jpg"]).await;
        let encoder = FakeEncoder::working();

        let out = compose(&store, &encoder, &EncodeParams::default(), "job").await.unwrap();
        assert!(out.output.ends_with(OUTPUT_FILE));
        let requests = encoder.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].audio.is_none());
        assert!(requests[0].manifest.ends_with(MANIFEST_FILE));
    }

    #[tokio::test]
    async fn test_passes_audio_when_narration_exists() {
        let (_tmp, store) = job_with_images(&["a.png"]).await;
        tokio::fs::write(store.artifact_path("job", AUDIO_FILE).unwrap(), b"mp3")
            .await
            .unwrap();
        let encoder = FakeEncoder::working();

        compose(&store, &encoder, &EncodeParams::default(), "job").await.unwrap();
        let requests = encoder.requests();
        assert!(requests[0].audio.as_ref().unwrap().ends_with(AUDIO_FILE));
    }

    #[tokio::test]
    async fn test_missing_image_fails_before_encoding() {
        let (_tmp, store) = job_with_images(&["a.png", "b.png"]).await;
        tokio::fs::remove_file(store.artifact_path("job", "b.png").unwrap())
            .await
            .unwrap();
        let encoder = FakeEncoder::working();

        match compose(&store, &encoder, &EncodeParams::default(), "job").await {
            Err(JobError::MissingImage(path)) => assert!(path.ends_with("b.png")),
            other => panic!("expected MissingImage, got {:?}", other.map(|o| o.output)),
        }
        assert!(encoder.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path());
        store.create("job").await.unwrap();
        let encoder = FakeEncoder::working();
        assert!(matches!(
            compose(&store, &encoder, &EncodeParams::default(), "job").await,
            Err(JobError::MissingManifest(_))
        ));
        assert!(encoder.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_after_run_fails() {
        let (_tmp, store) = job_with_images(&["a.png"]).await;
        tokio::fs::write(store.artifact_path("job", OUTPUT_FILE).unwrap(), b"old")
            .await
            .unwrap();
        let encoder = FakeEncoder::silent_failure();
        assert!(matches!(
            compose(&store, &encoder, &EncodeParams::default(), "job").await,
            Err(JobError::MissingOutput(_))
        ));
    }
}
