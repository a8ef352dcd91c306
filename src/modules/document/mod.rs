use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod handler;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::merge_documents))
        .route("/{token}/merged", get(handler::download_merged))
}
