use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use thiserror::Error;

use crate::common::response::ApiError;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Missing job token")]
    MissingToken,

    #[error("Invalid job token '{0}': use 1-64 characters from [A-Za-z0-9_-]")]
    InvalidToken(String),

    #[error("No files uploaded")]
    NoFiles,

    #[error("Malformed form data: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Manifest not found: {0}")]
    MissingManifest(PathBuf),

    #[error("Image referenced by manifest does not exist: {0}")]
    MissingImage(PathBuf),

    #[error("Encoder binary '{0}' could not be started")]
    EncoderNotFound(String),

    #[error("Encoder exited with code {exit_code:?}: {stderr}")]
    EncoderFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Encoder timed out after {0} seconds")]
    EncoderTimeout(u64),

    #[error("Encoder finished but produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("PDF merge failed: {0}")]
    Merge(String),

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JobError {
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            JobError::MissingToken
            | JobError::InvalidToken(_)
            | JobError::NoFiles
            | JobError::BadRequest(_) => StatusCode::BAD_REQUEST,
            JobError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        let status = e.status_code();
        ApiError(e.to_string(), status)
    }
}
