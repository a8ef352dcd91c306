use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::JobResult;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::infrastructure::storage::jobs::JobSummary;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub reels_root_exists: bool,
    pub documents_root_exists: bool,
    pub reels: Vec<JobSummary>,
    pub documents: Vec<JobSummary>,
}

pub async fn collect(state: &AppState) -> JobResult<StatusResponse> {
    Ok(StatusResponse {
        reels_root_exists: state.reels.root_exists().await,
        documents_root_exists: state.documents.root_exists().await,
        reels: state.reels.list().await?,
        documents: state.documents.list().await?,
    })
}

/// Storage roots and every job found under them
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Job folders", body = ApiResponse<StatusResponse>),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Status"
)]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    match collect(&state).await {
        Ok(status) => ApiSuccess(
            ApiResponse::success(status, "Status retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
