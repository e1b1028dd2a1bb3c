//! Ingestion orchestration: extract → chunk → embed → store
//!
//! One file is processed end-to-end per call. All of a document's chunks
//! are embedded in a single batched request and written to the vector store
//! as one unit, so a failure partway leaves nothing of the document visible
//! to queries.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::VectorStore;
use crate::types::Document;

use super::chunker::TextChunker;
use super::parser::FileParser;

/// Ingestion pipeline for one configured chunking policy
pub struct IngestPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStore>,
    max_file_size: u64,
}

impl IngestPipeline {
    /// Create a new pipeline
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        max_file_size: u64,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<VectorStore>,
    ) -> Result<Self> {
        Ok(Self {
            chunker: TextChunker::new(chunk_size, chunk_overlap)?,
            embedder,
            store,
            max_file_size,
        })
    }

    /// Ingest one uploaded file. Returns the document record with
    /// `total_chunks` set to the number of chunks now searchable.
    pub async fn ingest(&self, filename: &str, data: &[u8]) -> Result<Document> {
        // Reject unsupported formats and oversized uploads before doing
        // any extraction work
        FileParser::detect_format(filename)?;
        if data.len() as u64 > self.max_file_size {
            return Err(Error::PayloadTooLarge {
                size: data.len() as u64,
                limit: self.max_file_size,
            });
        }

        let extracted = FileParser::parse(filename, data)?;

        let mut doc = Document::new(
            filename.to_string(),
            extracted.format,
            extracted.content_hash,
            extracted.content,
            data.len() as u64,
        );

        let chunks = self.chunker.chunk_document(&doc, &doc.text);
        if chunks.is_empty() {
            tracing::warn!(filename, "document contained no extractable text; nothing stored");
            return Ok(doc);
        }

        // One batched embedding call per document
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "received {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let batch: Vec<_> = chunks.into_iter().zip(embeddings).collect();
        let added = self.store.add_batch(batch)?;
        doc.total_chunks = added as u32;

        tracing::info!(
            filename,
            document_id = %doc.id,
            chunks = added,
            "document ingested"
        );

        Ok(doc)
    }
}
