//! docqa-rag: RAG chat backend with document ingestion and cited answers
//!
//! Users upload documents over HTTP, the backend extracts and chunks their
//! text, embeds the chunks into a persistent vector store, and answers
//! natural-language queries by retrieving the most relevant chunks and
//! forwarding them with the query to a hosted LLM.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ChunkMetadata, Document, FileFormat},
    query::QueryRequest,
    response::{QueryResponse, RetrievedSource, UploadResponse},
};
