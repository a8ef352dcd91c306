use axum::{
    body::Bytes,
    extract::{multipart::Field, Multipart},
};
use futures_util::StreamExt;
use unicode_normalization::UnicodeNormalization;
use tracing::{debug, error};
use validator::Validate;

use crate::common::error::{JobError, JobResult};

pub const TOKEN_FIELD: &str = "uuid";
pub const TEXT_FIELD: &str = "text";

const MAX_FILENAME_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub token: Option<String>,
    pub text: Option<String>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Validate)]
pub struct Submission {
    #[validate(length(min = 1, max = 64, message = "Job token must be 1-64 characters"))]
    pub token: String,
    #[validate(length(max = 20000, message = "Description is too long"))]
    pub text: String,
    pub files: Vec<UploadedFile>,
}

impl SubmissionForm {
    pub fn into_submission(self) -> JobResult<Submission> {
        let token = self.token.ok_or(JobError::MissingToken)?;
        let submission = Submission {
            token,
            text: self.text.unwrap_or_default(),
            files: self.files,
        };
        submission
            .validate()
            .map_err(|e| JobError::BadRequest(e.to_string()))?;
        Ok(submission)
    }
}

/// File parts with an empty filename are dropped.
pub async fn read_submission(mut multipart: Multipart) -> JobResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JobError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let data = read_field(field).await?;
            if file_name.trim().is_empty() {
                continue;
            }
            debug!("Received file part '{}' ({} bytes)", file_name, data.len());
            form.files.push(UploadedFile {
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let value = String::from_utf8(read_field(field).await?.to_vec())
            .map_err(|_| JobError::BadRequest(format!("field '{}' is not valid UTF-8", name)))?;

        match name.as_str() {
            TOKEN_FIELD => form.token = Some(value.trim().to_string()).filter(|t| !t.is_empty()),
            TEXT_FIELD => form.text = Some(value),
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(form)
}

async fn read_field(mut field: Field<'_>) -> JobResult<Bytes> {
    let mut buffer = Vec::new();

    while let Some(chunk) = field.next().await {
        match chunk {
            Ok(c) => buffer.extend_from_slice(&c),
            Err(e) => {
                error!("Stream error: {}", e);
                return Err(JobError::BadRequest("Stream interrupted".to_string()));
            }
        }
    }

    Ok(Bytes::from(buffer))
}

/// Basename only, folded to ASCII, keeping `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let folded: String = base.nfkd().filter(char::is_ascii).collect();

    let cleaned: String = folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return None;
    }

    let mut out = trimmed.to_string();
    if out.len() > MAX_FILENAME_LEN {
        out.truncate(MAX_FILENAME_LEN);
    }
    Some(out)
}

pub fn accepts_upload(name: &str, allowed: &[&str]) -> bool {
    sanitize_filename(name).is_some_and(|stored| has_extension(&stored, allowed))
}

pub fn has_extension(name: &str, allowed: &[&str]) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
