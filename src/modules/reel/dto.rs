use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

use super::model::ReelReport;
use crate::infrastructure::storage::jobs::JobArtifacts;

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub uuid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReelStatusResponse {
    pub token: String,
    pub artifacts: JobArtifacts,
    pub report: Option<ReelReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryItem {
    pub token: String,
    pub video_url: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}
