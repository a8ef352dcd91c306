use utoipa::OpenApi;

use crate::infrastructure::storage::jobs::{JobArtifacts, JobSummary};
use crate::modules::reel::dto::{GalleryItem, ReelStatusResponse, TokenResponse};
use crate::modules::reel::model::{CompositionOutcome, NarrationOutcome, ReelReport, ReelStage};
use crate::modules::status::StatusResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::reel::handler::issue_token,
        crate::modules::reel::handler::create_reel,
        crate::modules::reel::handler::list_reels,
        crate::modules::reel::handler::get_reel,
        crate::modules::reel::handler::download_reel,
        crate::modules::reel::handler::gallery,
        crate::modules::document::handler::merge_documents,
        crate::modules::document::handler::download_merged,
        crate::modules::status::status,
    ),
    components(
        schemas(
            TokenResponse, ReelStatusResponse, GalleryItem,
            ReelReport, ReelStage, NarrationOutcome, CompositionOutcome,
            JobArtifacts, JobSummary, StatusResponse,
        )
    ),
    tags(
        (name = "Reels", description = "Image-to-video reel jobs"),
        (name = "Documents", description = "PDF merge jobs"),
        (name = "Status", description = "Job folder introspection")
    )
)]
pub struct ApiDoc;
