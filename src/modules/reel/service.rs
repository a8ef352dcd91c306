use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::composer::compose;
use super::dto::{GalleryItem, ReelStatusResponse, TokenResponse};
use super::manifest;
use super::model::{CompositionOutcome, ReelReport, ReelStage};
use super::narration::narrate;
use crate::common::error::{JobError, JobResult};
use crate::common::upload::{accepts_upload, Submission};
use crate::infrastructure::storage::jobs::{
    JobStore, JobSummary, MANIFEST_FILE, OUTPUT_FILE, REPORT_FILE,
};
use crate::state::AppState;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub struct ReelService;

impl ReelService {
    pub fn issue_token() -> TokenResponse {
        TokenResponse {
            uuid: JobStore::issue_token(),
        }
    }

    /// A composition failure still returns `Ok`; the report carries the reason.
    pub async fn submit(state: AppState, submission: Submission) -> JobResult<ReelReport> {
        let store = &state.reels;
        let token = submission.token.as_str();

        store.create(token).await?;
        let mut report = ReelReport::new(token);

        if !submission.text.trim().is_empty() {
            store.save_description(token, &submission.text).await?;
        }
        report.advance(ReelStage::DescriptionSaved);

        for file in &submission.files {
            if !accepts_upload(&file.file_name, &IMAGE_EXTENSIONS) {
                warn!(
                    "Skipping non-image upload '{}' ({}) for {}",
                    file.file_name,
                    file.content_type.as_deref().unwrap_or("unknown type"),
                    token
                );
                report.skipped_files.push(file.file_name.clone());
                continue;
            }
            match store.save_upload(token, &file.file_name, &file.data).await? {
                Some(name) => {
                    info!("Saved file: {}", name);
                    report.images.push(name);
                }
                None => report.skipped_files.push(file.file_name.clone()),
            }
        }

        if report.images.is_empty() {
            return Err(JobError::NoFiles);
        }

        let entries = manifest::build(
            &store.job_dir(token)?,
            &report.images,
            state.config.image_duration_secs,
        )?;
        manifest::write(&store.artifact_path(token, MANIFEST_FILE)?, &entries).await?;
        report.advance(ReelStage::ManifestWritten);

        let narration = narrate(store, state.synthesizer.as_ref(), token).await?;
        let with_audio = narration.has_audio();
        report.narration = Some(narration);
        report.advance(ReelStage::NarrationAttempted);

        let outcome = match compose(store, state.encoder.as_ref(), &state.encode_params(), token).await {
            Ok(output) => {
                info!("Reel for {} written to {}", token, output.output.display());
                if !output.log.is_empty() {
                    debug!("Encoder output for {}: {}", token, output.log);
                }
                CompositionOutcome::Ok {
                    with_audio,
                    exit_code: output.exit_code,
                }
            }
            Err(e) => {
                error!("Error creating reel for {}: {}", token, e);
                CompositionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report.composition = Some(outcome);
        report.advance(ReelStage::Composed);
        report.finish();

        store.write_json(token, REPORT_FILE, &report).await?;

        if report.succeeded() {
            info!("Successfully created reel: {}", token);
        }
        Ok(report)
    }

    pub async fn status(state: AppState, token: &str) -> JobResult<ReelStatusResponse> {
        let artifacts = state.reels.artifacts(token).await?;
        let report = state.reels.read_json::<ReelReport>(token, REPORT_FILE).await?;
        Ok(ReelStatusResponse {
            token: token.to_string(),
            artifacts,
            report,
        })
    }

    pub async fn list(state: AppState) -> JobResult<Vec<JobSummary>> {
        state.reels.list().await
    }

    pub async fn gallery(state: AppState) -> JobResult<Vec<GalleryItem>> {
        let jobs = state.reels.list().await?;
        Ok(jobs
            .into_iter()
            .filter(|j| j.artifacts.output)
            .map(|j| GalleryItem {
                video_url: format!("/api/v1/reels/{}/video", j.token),
                token: j.token,
                created_at: j.modified_at,
            })
            .collect())
    }

    pub async fn video_path(state: AppState, token: &str) -> JobResult<PathBuf> {
        if !state.reels.has_artifact(token, OUTPUT_FILE).await? {
            return Err(JobError::NotFound(format!("Reel {}", token)));
        }
        state.reels.artifact_path(token, OUTPUT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::upload::UploadedFile;
    use crate::infrastructure::storage::jobs::{AUDIO_FILE, DESCRIPTION_FILE};
    use crate::modules::reel::model::NarrationOutcome;
    use crate::test_support::{test_state, FakeEncoder, FakeSynthesizer};
    use bytes::Bytes;
    use std::sync::Arc;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    fn submission(token: &str, text: &str, files: &[&str]) -> Submission {
        Submission {
            token: token.to_string(),
            text: text.to_string(),
            files: files.iter().map(|f| file(f)).collect(),
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_with_narration() {
        let dir = tempfile::tempdir().unwrap();
        let tts = Arc::new(FakeSynthesizer::working());
        let encoder = Arc::new(FakeEncoder::working());
        let state = test_state(dir.path(), tts.clone(), encoder.clone());

        let report = ReelService::submit(
            state.clone(),
            submission("job1", "Sunset over the bay", &["one.png", "notes.txt", "two.JPG"]),
        )
        .await
        .unwrap();

        assert!(report.succeeded());
        assert_eq!(report.stage, ReelStage::Composed);
        assert_eq!(report.images, vec!["one.png", "two.JPG"]);
        assert_eq!(report.skipped_files, vec!["notes.txt"]);
        assert!(matches!(report.narration, Some(NarrationOutcome::Generated { .. })));

        let manifest = tokio::fs::read_to_string(state.reels.artifact_path("job1", MANIFEST_FILE).unwrap())
            .await
            .unwrap();
        let refs: Vec<_> = manifest.lines().filter(|l| l.starts_with("file ")).collect();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].ends_with("/job1/one.png'"));
        assert!(refs[1].ends_with("/job1/two.JPG'"));

        let requests = encoder.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].audio.as_ref().unwrap().ends_with(AUDIO_FILE));

        let status = ReelService::status(state.clone(), "job1").await.unwrap();
        assert!(status.artifacts.output && status.artifacts.description && status.artifacts.audio);
        assert!(status.report.unwrap().succeeded());

        let gallery = ReelService::gallery(state.clone()).await.unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].video_url, "/api/v1/reels/job1/video");
        assert!(ReelService::video_path(state, "job1").await.is_ok());
    }

    #[tokio::test]
    async fn test_narration_failure_falls_back_to_silent_reel() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Arc::new(FakeEncoder::working());
        let state = test_state(dir.path(), Arc::new(FakeSynthesizer::failing()), encoder.clone());

        let report = ReelService::submit(state, submission("job2", "hello", &["a.png"]))
            .await
            .unwrap();

        assert!(report.succeeded());
        assert!(matches!(report.narration, Some(NarrationOutcome::Failed { .. })));
        assert!(encoder.requests()[0].audio.is_none());
    }

    #[tokio::test]
    async fn test_images_losing_their_extension_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Arc::new(FakeEncoder::working());
        let state = test_state(dir.path(), Arc::new(FakeSynthesizer::working()), encoder.clone());

        let report = ReelService::submit(state.clone(), submission("job5", "", &["日本.png", "café.png"]))
            .await
            .unwrap();

        assert_eq!(report.images, vec!["cafe.png"]);
        assert_eq!(report.skipped_files, vec!["日本.png"]);
        let artifacts = state.reels.artifacts("job5").await.unwrap();
        assert_eq!(artifacts.uploads, vec!["cafe.png"]);
    }

    #[tokio::test]
    async fn test_no_images_means_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Arc::new(FakeEncoder::working());
        let state = test_state(dir.path(), Arc::new(FakeSynthesizer::working()), encoder.clone());

        let err = ReelService::submit(state.clone(), submission("job3", "words", &["doc.pdf"]))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::NoFiles));

        let artifacts = state.reels.artifacts("job3").await.unwrap();
        assert!(!artifacts.manifest);
        assert!(artifacts.description);
        assert!(encoder.requests().is_empty());
        assert!(state.reels.root().join("job3").join(DESCRIPTION_FILE).is_file());
    }

    #[tokio::test]
    async fn test_composition_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            Arc::new(FakeSynthesizer::working()),
            Arc::new(FakeEncoder::silent_failure()),
        );

        let report = ReelService::submit(state.clone(), submission("job4", "", &["a.png"]))
            .await
            .unwrap();
        assert!(!report.succeeded());
        assert_eq!(report.narration, Some(NarrationOutcome::Skipped));
        assert!(report.failure_reason().unwrap().contains("no output"));

        assert!(matches!(
            ReelService::video_path(state, "job4").await,
            Err(JobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_jobs_do_not_share_folders() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            Arc::new(FakeSynthesizer::working()),
            Arc::new(FakeEncoder::working()),
        );

        ReelService::submit(state.clone(), submission("a", "", &["x.png"])).await.unwrap();
        ReelService::submit(state.clone(), submission("b", "", &["y.png"])).await.unwrap();

        let a = state.reels.artifacts("a").await.unwrap();
        let b = state.reels.artifacts("b").await.unwrap();
        assert_eq!(a.uploads, vec!["x.png"]);
        assert_eq!(b.uploads, vec!["y.png"]);
        assert_eq!(ReelService::list(state).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            Arc::new(FakeSynthesizer::working()),
            Arc::new(FakeEncoder::working()),
        );
        let err = ReelService::submit(state.clone(), submission("../x", "", &["a.png"]))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidToken(_)));
        assert!(!state.reels.root_exists().await);
    }
}
