//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Chunk, ChunkMetadata, Document};

/// A retrieved chunk with its similarity score, as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSource {
    /// Chunk ID (`"{document_id}:{chunk_index}"`)
    pub chunk_id: String,
    /// Chunk text
    pub content: String,
    /// Similarity to the query (higher is closer)
    pub similarity_score: f32,
    /// Citation metadata
    pub metadata: ChunkMetadata,
}

impl RetrievedSource {
    /// Build from a stored chunk and its score
    pub fn from_chunk(chunk: &Chunk, similarity_score: f32) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            content: chunk.content.clone(),
            similarity_score,
            metadata: chunk.metadata.clone(),
        }
    }
}

/// Response from a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Document ID assigned to the upload
    pub file_id: Uuid,
    /// Original filename
    pub filename: String,
    /// Number of chunks now searchable
    pub chunks_created: u32,
    /// Human-readable confirmation
    pub message: String,
}

impl UploadResponse {
    pub fn new(doc: &Document) -> Self {
        Self {
            file_id: doc.id,
            filename: doc.filename.clone(),
            chunks_created: doc.total_chunks,
            message: format!("Successfully processed {}", doc.filename),
        }
    }
}

/// Response from a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The original query
    pub query: String,
    /// Generated answer; absent when generation was disabled or the store
    /// is empty
    pub answer: Option<String>,
    /// Ranked source chunks
    pub sources: Vec<RetrievedSource>,
    /// Reason generation degraded, when it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_error: Option<String>,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Response for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Service status
    pub status: String,
    /// Total chunks held by the vector store
    pub total_chunks: usize,
    /// Total distinct documents held by the vector store
    pub total_documents: usize,
}

/// Response for the clear endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}
