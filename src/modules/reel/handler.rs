use super::dto::{GalleryItem, ReelStatusResponse, TokenResponse};
use super::model::ReelReport;
use super::service::ReelService;
use crate::common::download::file_response;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::read_submission;
use crate::infrastructure::storage::jobs::{JobSummary, OUTPUT_FILE};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Issue a fresh job token
#[utoipa::path(
    get,
    path = "/api/v1/tokens",
    responses(
        (status = 200, description = "New job token", body = ApiResponse<TokenResponse>)
    ),
    tag = "Reels"
)]
pub async fn issue_token() -> impl IntoResponse {
    ApiSuccess(
        ApiResponse::success(ReelService::issue_token(), "Token issued"),
        StatusCode::OK,
    )
}

/// Upload images and a description, then render the reel
#[utoipa::path(
    post,
    path = "/api/v1/reels",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Reel created", body = ApiResponse<ReelReport>),
        (status = 400, description = "Missing token or no files uploaded"),
        (status = 500, description = "Composition or filesystem failure", body = ApiResponse<ReelReport>)
    ),
    tag = "Reels"
)]
pub async fn create_reel(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    let submission = match read_submission(multipart).await.and_then(|f| f.into_submission()) {
        Ok(s) => s,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match ReelService::submit(state, submission).await {
        Ok(report) if report.succeeded() => ApiSuccess(
            ApiResponse::success(report, "Reel created successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Ok(report) => {
            let message = format!(
                "Error creating reel: {}",
                report.failure_reason().unwrap_or("unknown error")
            );
            ApiSuccess(
                ApiResponse::failure(report, &message),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List reel jobs
#[utoipa::path(
    get,
    path = "/api/v1/reels",
    responses(
        (status = 200, description = "Reel jobs, newest first", body = ApiResponse<Vec<JobSummary>>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Reels"
)]
pub async fn list_reels(State(state): State<AppState>) -> impl IntoResponse {
    match ReelService::list(state).await {
        Ok(jobs) => ApiSuccess(
            ApiResponse::success(jobs, "Reels retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Get artifacts and report of one reel job
#[utoipa::path(
    get,
    path = "/api/v1/reels/{token}",
    params(
        ("token" = String, Path, description = "Job token")
    ),
    responses(
        (status = 200, description = "Reel job status", body = ApiResponse<ReelStatusResponse>),
        (status = 400, description = "Invalid token"),
        (status = 404, description = "Job not found")
    ),
    tag = "Reels"
)]
pub async fn get_reel(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match ReelService::status(state, &token).await {
        Ok(status) => ApiSuccess(
            ApiResponse::success(status, "Reel retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download the rendered reel
#[utoipa::path(
    get,
    path = "/api/v1/reels/{token}/video",
    params(
        ("token" = String, Path, description = "Job token")
    ),
    responses(
        (status = 200, description = "Reel video", body = Vec<u8>),
        (status = 404, description = "Reel not found")
    ),
    tag = "Reels"
)]
pub async fn download_reel(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let path = match ReelService::video_path(state, &token).await {
        Ok(p) => p,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let name = format!("{}_{}", token, OUTPUT_FILE);
    match file_response(&path, Some(&name)).await {
        Ok(response) => response,
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Completed reels, newest first
#[utoipa::path(
    get,
    path = "/api/v1/gallery",
    responses(
        (status = 200, description = "Finished reels", body = ApiResponse<Vec<GalleryItem>>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Reels"
)]
pub async fn gallery(State(state): State<AppState>) -> impl IntoResponse {
    match ReelService::gallery(state).await {
        Ok(items) => ApiSuccess(
            ApiResponse::success(items, "Gallery retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
