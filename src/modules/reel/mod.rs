use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod composer;
pub mod dto;
pub mod handler;
pub mod manifest;
pub mod model;
pub mod narration;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_reels).post(handler::create_reel))
        .route("/{token}", get(handler::get_reel))
        .route("/{token}/video", get(handler::download_reel))
}
