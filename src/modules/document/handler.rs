use super::service::DocumentService;
use crate::common::download::file_response;
use crate::common::response::ApiError;
use crate::common::upload::read_submission;
use crate::infrastructure::storage::jobs::MERGED_FILE;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Upload PDFs and download them merged into one document
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Merged PDF", body = Vec<u8>),
        (status = 400, description = "Missing token or no PDF files uploaded"),
        (status = 500, description = "Merge or filesystem failure")
    ),
    tag = "Documents"
)]
pub async fn merge_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let submission = match read_submission(multipart).await.and_then(|f| f.into_submission()) {
        Ok(s) => s,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let report = match DocumentService::merge(state, submission).await {
        Ok(Some(report)) => report,
        Ok(None) => {
            return ApiError("No PDF files uploaded".to_string(), StatusCode::BAD_REQUEST)
                .into_response()
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    match file_response(&report.output, Some(MERGED_FILE)).await {
        Ok(response) => response,
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download a previously merged document
#[utoipa::path(
    get,
    path = "/api/v1/documents/{token}/merged",
    params(
        ("token" = String, Path, description = "Job token")
    ),
    responses(
        (status = 200, description = "Merged PDF", body = Vec<u8>),
        (status = 404, description = "Merged document not found")
    ),
    tag = "Documents"
)]
pub async fn download_merged(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let path = match DocumentService::merged_path(state, &token).await {
        Ok(p) => p,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match file_response(&path, Some(MERGED_FILE)).await {
        Ok(response) => response,
        Err(e) => ApiError::from(e).into_response(),
    }
}
