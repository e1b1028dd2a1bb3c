//! Application state for the RAG server

use dashmap::DashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::IngestPipeline;
use crate::providers::{EmbeddingProvider, GeminiClient, GenerationProvider, OllamaEmbedder};
use crate::retrieval::{QueryEngine, VectorStore};
use crate::storage::UploadStore;
use crate::types::Document;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The one vector store instance; constructed here, torn down with the
    /// process
    store: Arc<VectorStore>,
    /// Ingestion orchestrator (the store's sole writer)
    pipeline: IngestPipeline,
    /// Query orchestrator (read-only over the store)
    engine: QueryEngine,
    /// Raw-upload store
    uploads: UploadStore,
    /// Document registry, persisted to documents.json
    documents: DashMap<Uuid, Document>,
    /// Path of the persisted registry
    documents_path: PathBuf,
    /// Store-wide writer lock: ingestion and clear-all serialize here so
    /// the on-disk state always reflects complete documents
    write_lock: Mutex<()>,
}

impl AppState {
    /// Build the application state from validated configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embedding));
        let generator: Arc<dyn GenerationProvider> = Arc::new(GeminiClient::new(&config.generation));

        let store = Arc::new(VectorStore::open(
            config.store_path(),
            embedder.model_id(),
            embedder.dimensions(),
            config.retrieval.metric,
        )?);

        let pipeline = IngestPipeline::new(
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
            config.server.max_upload_size,
            Arc::clone(&embedder),
            Arc::clone(&store),
        )?;

        let engine = QueryEngine::new(
            embedder,
            generator,
            Arc::clone(&store),
            config.retrieval.top_k,
        );

        let uploads = UploadStore::new(config.uploads_dir());

        let documents_path = config.documents_path();
        let documents = Self::load_documents(&documents_path);
        tracing::info!(documents = documents.len(), "document registry loaded");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                pipeline,
                engine,
                uploads,
                documents,
                documents_path,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Load the document registry from disk
    fn load_documents(path: &PathBuf) -> DashMap<Uuid, Document> {
        let documents = DashMap::new();

        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Vec<Document>>(&content) {
                    Ok(docs) => {
                        for doc in docs {
                            documents.insert(doc.id, doc);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to parse documents.json");
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read documents.json");
                }
            }
        }

        documents
    }

    /// Persist the document registry
    fn save_documents(&self) {
        let docs: Vec<Document> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        if let Some(parent) = self.inner.documents_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!(error = %e, "failed to create data directory");
                return;
            }
        }

        match serde_json::to_string_pretty(&docs) {
            Ok(content) => {
                if let Err(e) = fs::write(&self.inner.documents_path, content) {
                    tracing::error!(error = %e, "failed to save documents.json");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize document registry");
            }
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the vector store
    pub fn store(&self) -> &Arc<VectorStore> {
        &self.inner.store
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Get the query engine
    pub fn engine(&self) -> &QueryEngine {
        &self.inner.engine
    }

    /// Get the raw-upload store
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    /// The store-wide writer lock; hold it across any mutation
    pub fn write_lock(&self) -> &Mutex<()> {
        &self.inner.write_lock
    }

    /// Add a document to the registry (persisted)
    pub fn add_document(&self, doc: Document) {
        self.inner.documents.insert(doc.id, doc);
        self.save_documents();
    }

    /// Number of registered documents
    pub fn document_count(&self) -> usize {
        self.inner.documents.len()
    }

    /// Wipe everything: vector store, document registry, saved uploads.
    /// Callers must hold the writer lock.
    pub async fn clear_all(&self) -> Result<()> {
        self.inner.store.clear()?;
        self.inner.documents.clear();

        if self.inner.documents_path.exists() {
            fs::remove_file(&self.inner.documents_path)?;
        }

        let removed = self.inner.uploads.clear().await?;
        tracing::info!(uploads_removed = removed, "store cleared");

        Ok(())
    }
}
