//! Configuration for the RAG backend
//!
//! Defaults live in code, an optional TOML file overrides them, and
//! environment variables override both. The core components receive these
//! values as constructor parameters; nothing here is read again after
//! startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::DistanceMetric;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding backend configuration
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Hosted generation API configuration
    pub generation: GenerationConfig,
    /// Storage configuration
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Allowed CORS origins ("*" allows any)
    pub cors_origins: Vec<String>,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding backend base URL (Ollama-compatible API)
    pub base_url: String,
    /// Embedding model identifier; pinned into the vector store at first write
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of chunks returned per query
    pub top_k: usize,
    /// Distance metric; must match the metric the index was built with
    pub metric: DistanceMetric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// Hosted generation API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API key for the hosted model; generation is skipped with a degraded
    /// answer when empty
    pub api_key: String,
    /// Generation model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling parameter
    pub top_p: f32,
    /// Maximum output tokens per answer
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            max_output_tokens: 2048,
            timeout_secs: 120,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory for the vector store snapshot, document registry,
    /// and saved uploads
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docqa-rag");
        Self { data_dir }
    }
}

impl RagConfig {
    /// Load configuration: defaults, then the TOML file at `path` (if any),
    /// then environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("invalid config file {}: {}", p.display(), e)))?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("DOCQA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("DOCQA_PORT") {
            self.server.port = port;
        }
        if let Ok(origins) = std::env::var("DOCQA_CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&origins);
        }
        if let Some(max) = env_parse("DOCQA_MAX_UPLOAD_SIZE") {
            self.server.max_upload_size = max;
        }
        if let Ok(url) = std::env::var("DOCQA_EMBED_URL") {
            self.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("DOCQA_EMBED_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dims) = env_parse("DOCQA_EMBED_DIMENSIONS") {
            self.embedding.dimensions = dims;
        }
        if let Some(size) = env_parse("DOCQA_CHUNK_SIZE") {
            self.chunking.chunk_size = size;
        }
        if let Some(overlap) = env_parse("DOCQA_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = overlap;
        }
        if let Some(top_k) = env_parse("DOCQA_TOP_K") {
            self.retrieval.top_k = top_k;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.generation.api_key = key;
        }
        if let Ok(model) = std::env::var("DOCQA_GENERATE_MODEL") {
            self.generation.model = model;
        }
        if let Ok(dir) = std::env::var("DOCQA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    /// Validate settings that are fatal at startup
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be greater than zero".to_string()));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Path of the vector store snapshot
    pub fn store_path(&self) -> PathBuf {
        self.storage.data_dir.join("vector_store.json")
    }

    /// Path of the persisted document registry
    pub fn documents_path(&self) -> PathBuf {
        self.storage.data_dir.join("documents.json")
    }

    /// Directory where raw uploads are kept
    pub fn uploads_dir(&self) -> PathBuf {
        self.storage.data_dir.join("uploads")
    }
}

/// Parse a comma-separated origin list (environment variables cannot carry
/// arrays)
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
