//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// POST /api/upload - Ingest one uploaded file
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::InvalidRequest("uploaded file has no filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("failed to read '{}': {}", filename, e)))?;

        upload = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| {
        Error::InvalidRequest("multipart field 'file' is required".to_string())
    })?;

    tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

    // One file fully processed at a time; queries keep running meanwhile
    let _guard = state.write_lock().lock().await;

    let doc = state.pipeline().ingest(&filename, &data).await?;

    // Keep the original for inspection; ingestion already succeeded, so a
    // failure here only costs the saved copy
    if let Err(e) = state.uploads().save(&doc, &data).await {
        tracing::warn!("Failed to save raw upload '{}': {}", filename, e);
    }

    let response = UploadResponse::new(&doc);
    state.add_document(doc);

    Ok(Json(response))
}
