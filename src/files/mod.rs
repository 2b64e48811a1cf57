use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

/// Uploads are capped upstream of the handlers; the lifecycle service
/// trusts the declared content type below this ceiling.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload_file))
        .route("/", get(handlers::list_files))
        .route("/search", get(handlers::search_files))
        .route("/update/:file_id", put(handlers::update_file))
        .route("/delete/:file_id", delete(handlers::delete_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
