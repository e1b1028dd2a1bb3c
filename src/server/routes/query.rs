//! Query endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /api/query - Answer a question over the ingested documents
pub async fn query_documents(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    tracing::info!(query = %request.query, "query received");

    let outcome = state
        .engine()
        .answer(&request.query, request.top_k, request.use_generation)
        .await?;

    Ok(Json(QueryResponse {
        query: request.query,
        answer: outcome.answer,
        sources: outcome.sources,
        generation_error: outcome.generation_error,
        timestamp: chrono::Utc::now(),
    }))
}
