//! API routes for the RAG server

pub mod admin;
pub mod query;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: u64) -> Router<AppState> {
    // Body limit leaves room for multipart framing; the pipeline enforces
    // the exact per-file limit
    let body_limit = max_upload_size as usize + 64 * 1024;

    Router::new()
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/query", post(query::query_documents))
        .route("/clear", delete(admin::clear_store))
        .route("/status", get(admin::get_status))
}
