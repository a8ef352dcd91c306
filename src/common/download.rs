use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::common::error::{JobError, JobResult};

pub async fn file_response(path: &Path, attachment: Option<&str>) -> JobResult<Response> {
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(JobError::NotFound(format!("File {}", path.display())));
        }
        Err(e) => return Err(JobError::fs(path, e)),
    };
    let metadata = file.metadata().await.map_err(|e| JobError::fs(path, e))?;

    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.len());

    if let Some(name) = attachment {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        );
    }

    let body = Body::from_stream(ReaderStream::new(file));

    builder
        .body(body)
        .map_err(|e| JobError::fs(path, std::io::Error::other(e)))
}
