//! Store administration endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ClearResponse, StatusResponse};

/// DELETE /api/clear - Wipe the vector store, registry, and saved uploads
pub async fn clear_store(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let _guard = state.write_lock().lock().await;
    state.clear_all().await?;

    Ok(Json(ClearResponse {
        message: "Vector store cleared successfully".to_string(),
    }))
}

/// GET /api/status - Read-only store statistics
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = state.store().stats();

    Json(StatusResponse {
        status: "ready".to_string(),
        total_chunks: stats.total_chunks,
        total_documents: stats.total_documents,
    })
}
