use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use tokio::fs;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::{JobError, JobResult};
use crate::common::upload::sanitize_filename;

pub const DESCRIPTION_FILE: &str = "desc.txt";
pub const MANIFEST_FILE: &str = "input.txt";
pub const AUDIO_FILE: &str = "audio.mp3";
pub const OUTPUT_FILE: &str = "reel.mp4";
pub const MERGED_FILE: &str = "merged.pdf";
pub const REPORT_FILE: &str = "report.json";

const RESERVED_FILES: [&str; 6] = [
    DESCRIPTION_FILE,
    MANIFEST_FILE,
    AUDIO_FILE,
    OUTPUT_FILE,
    MERGED_FILE,
    REPORT_FILE,
];

const MAX_TOKEN_LEN: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct JobArtifacts {
    pub description: bool,
    pub manifest: bool,
    pub audio: bool,
    pub output: bool,
    pub merged: bool,
    pub report: bool,
    pub uploads: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobSummary {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub modified_at: OffsetDateTime,
    pub artifacts: JobArtifacts,
}

#[derive(Clone, Debug)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> JobResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| JobError::fs(&self.root, e))?;
        debug!("Job root ready at {}", self.root.display());
        Ok(())
    }

    pub async fn root_exists(&self) -> bool {
        fs::metadata(&self.root).await.map(|m| m.is_dir()).unwrap_or(false)
    }

    pub fn issue_token() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn validate_token(token: &str) -> JobResult<()> {
        if token.is_empty() {
            return Err(JobError::MissingToken);
        }
        let valid = token.len() <= MAX_TOKEN_LEN
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(JobError::InvalidToken(token.chars().take(MAX_TOKEN_LEN).collect()));
        }
        Ok(())
    }

    pub fn job_dir(&self, token: &str) -> JobResult<PathBuf> {
        Self::validate_token(token)?;
        Ok(self.root.join(token))
    }

    pub fn artifact_path(&self, token: &str, name: &str) -> JobResult<PathBuf> {
        Ok(self.job_dir(token)?.join(name))
    }

    /// Idempotent.
    pub async fn create(&self, token: &str) -> JobResult<PathBuf> {
        let dir = self.job_dir(token)?;
        fs::create_dir_all(&dir).await.map_err(|e| JobError::fs(&dir, e))?;
        debug!("Job folder {}", dir.display());
        Ok(dir)
    }

    pub async fn save_description(&self, token: &str, text: &str) -> JobResult<PathBuf> {
        let path = self.artifact_path(token, DESCRIPTION_FILE)?;
        fs::write(&path, text).await.map_err(|e| JobError::fs(&path, e))?;
        Ok(path)
    }

    pub async fn read_description(&self, token: &str) -> JobResult<Option<String>> {
        let path = self.artifact_path(token, DESCRIPTION_FILE)?;
        match fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JobError::fs(&path, e)),
        }
    }

    /// Names that collide with job artifacts get an `upload_` prefix.
    pub async fn save_upload(
        &self,
        token: &str,
        original_name: &str,
        data: &[u8],
    ) -> JobResult<Option<String>> {
        let Some(mut name) = sanitize_filename(original_name) else {
            return Ok(None);
        };
        if RESERVED_FILES.iter().any(|r| r.eq_ignore_ascii_case(&name)) {
            name = format!("upload_{}", name);
        }

        let path = self.artifact_path(token, &name)?;
        fs::write(&path, data).await.map_err(|e| JobError::fs(&path, e))?;
        debug!("Saved upload {} ({} bytes)", path.display(), data.len());
        Ok(Some(name))
    }

    pub async fn has_artifact(&self, token: &str, name: &str) -> JobResult<bool> {
        let path = self.artifact_path(token, name)?;
        Ok(is_nonempty_file(&path).await)
    }

    pub async fn artifacts(&self, token: &str) -> JobResult<JobArtifacts> {
        let dir = self.job_dir(token)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JobError::NotFound(format!("Job {}", token)));
            }
            Err(e) => return Err(JobError::fs(&dir, e)),
        };

        let mut artifacts = JobArtifacts::default();
        while let Some(entry) = entries.next_entry().await.map_err(|e| JobError::fs(&dir, e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match name.as_str() {
                DESCRIPTION_FILE => artifacts.description = true,
                MANIFEST_FILE => artifacts.manifest = true,
                AUDIO_FILE => artifacts.audio = is_nonempty_file(&entry.path()).await,
                OUTPUT_FILE => artifacts.output = true,
                MERGED_FILE => artifacts.merged = true,
                REPORT_FILE => artifacts.report = true,
                _ => artifacts.uploads.push(name),
            }
        }
        artifacts.uploads.sort();
        Ok(artifacts)
    }

    /// Newest first.
    pub async fn list(&self) -> JobResult<Vec<JobSummary>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(JobError::fs(&self.root, e)),
        };

        let mut jobs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JobError::fs(&self.root, e))?
        {
            let token = entry.file_name().to_string_lossy().to_string();
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_dir() || Self::validate_token(&token).is_err() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if let Some(summary) = self.summarize(token, modified).await {
                jobs.push(summary);
            }
        }

        jobs.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.token.cmp(&a.token))
        });
        Ok(jobs)
    }

    async fn summarize(&self, token: String, modified: SystemTime) -> Option<JobSummary> {
        match self.artifacts(&token).await {
            Ok(artifacts) => Some(JobSummary {
                token,
                modified_at: OffsetDateTime::from(modified),
                artifacts,
            }),
            Err(e) => {
                warn!("Skipping job folder {} while listing: {}", token, e);
                None
            }
        }
    }

    pub async fn write_json<T: Serialize>(&self, token: &str, name: &str, value: &T) -> JobResult<()> {
        let path = self.artifact_path(token, name)?;
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| JobError::fs(&path, std::io::Error::other(e)))?;
        fs::write(&path, body).await.map_err(|e| JobError::fs(&path, e))
    }

    pub async fn read_json<T: DeserializeOwned>(&self, token: &str, name: &str) -> JobResult<Option<T>> {
        let path = self.artifact_path(token, name)?;
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JobError::fs(&path, e)),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| JobError::fs(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

pub async fn is_nonempty_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
