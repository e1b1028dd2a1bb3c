//! Query request types

use serde::{Deserialize, Serialize};

/// Query request for the RAG endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub query: String,

    /// Number of chunks to retrieve; falls back to the configured default
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Whether to generate an answer or return sources only (default: true)
    #[serde(default = "default_use_generation")]
    pub use_generation: bool,
}

fn default_use_generation() -> bool {
    true
}

impl QueryRequest {
    /// Create a new query with defaults
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            use_generation: true,
        }
    }

    /// Set the number of results to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Retrieval only, no answer generation
    pub fn sources_only(mut self) -> Self {
        self.use_generation = false;
        self
    }
}
