use std::path::PathBuf;

use tracing::{info, warn};

use crate::common::error::{JobError, JobResult};
use crate::common::upload::{accepts_upload, Submission};
use crate::infrastructure::pdf::{merge_documents, MergeReport};
use crate::infrastructure::storage::jobs::MERGED_FILE;
use crate::state::AppState;

pub const PDF_EXTENSIONS: [&str; 1] = ["pdf"];

pub struct DocumentService;

impl DocumentService {
    /// Returns `None` when no PDF was uploaded.
    pub async fn merge(state: AppState, submission: Submission) -> JobResult<Option<MergeReport>> {
        let store = state.documents.clone();
        let token = submission.token.as_str();

        store.create(token).await?;
        store.save_description(token, &submission.text).await?;

        let mut inputs = Vec::new();
        for file in &submission.files {
            if !accepts_upload(&file.file_name, &PDF_EXTENSIONS) {
                warn!("Skipping non-PDF upload '{}' for {}", file.file_name, token);
                continue;
            }
            if let Some(name) = store.save_upload(token, &file.file_name, &file.data).await? {
                info!("Saved file: {}", name);
                inputs.push(store.artifact_path(token, &name)?);
            }
        }

        let output = store.artifact_path(token, MERGED_FILE)?;
        let report = tokio::task::spawn_blocking(move || merge_documents(&inputs, &output))
            .await
            .map_err(|e| JobError::Merge(format!("merge task failed: {}", e)))??;

        match &report {
            Some(r) => info!("Merged {} PDFs into {} pages for {}", r.inputs, r.pages, token),
            None => warn!("No PDF files uploaded for {}", token),
        }
        Ok(report)
    }

    pub async fn merged_path(state: AppState, token: &str) -> JobResult<PathBuf> {
        if !state.documents.has_artifact(token, MERGED_FILE).await? {
            return Err(JobError::NotFound(format!("Merged document {}", token)));
        }
        state.documents.artifact_path(token, MERGED_FILE)
    }
}
