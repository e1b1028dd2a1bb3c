//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for turning text into fixed-dimension vectors
///
/// The same provider (and model) must be used at ingestion and query time;
/// the vector store pins `model_id()` into its snapshot to enforce this.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts.
    ///
    /// The default calls `embed` sequentially; backends with a batch
    /// endpoint should override so a document's chunks go out as one
    /// request.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Vector dimensionality this provider produces
    fn dimensions(&self) -> usize;

    /// Model identifier, pinned per vector-store instance
    fn model_id(&self) -> &str;

    /// Check whether the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
