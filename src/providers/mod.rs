//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams keep the orchestrators independent of the concrete backends
//! and let tests substitute stubs.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::GenerationProvider;
pub use ollama::OllamaEmbedder;
