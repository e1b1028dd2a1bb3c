//! Query orchestration: embed → search → generate
//!
//! Generation is best-effort: when the hosted API fails, the retrieval
//! results are still returned with a degraded answer, and the failure goes
//! to the tracing path.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, GenerationProvider};
use crate::types::RetrievedSource;

use super::store::VectorStore;

/// Placeholder answer when generation degrades; retrieval output is still
/// returned alongside it
const GENERATION_DEGRADED_ANSWER: &str =
    "An answer could not be generated for this query. The retrieved sources are still included.";

/// Outcome of one query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Generated answer; `None` when generation was disabled or the store
    /// is empty
    pub answer: Option<String>,
    /// Ranked retrieval results
    pub sources: Vec<RetrievedSource>,
    /// Why generation degraded, when it did
    pub generation_error: Option<String>,
}

/// End-to-end query answering over one store instance
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    store: Arc<VectorStore>,
    default_top_k: usize,
}

impl QueryEngine {
    /// Create a new engine
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        store: Arc<VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            default_top_k,
        }
    }

    /// Answer one query end-to-end
    pub async fn answer(
        &self,
        query: &str,
        top_k: Option<usize>,
        use_generation: bool,
    ) -> Result<QueryOutcome> {
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery("query must not be empty".to_string()));
        }
        let top_k = top_k.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Err(Error::InvalidQuery("top_k must be greater than zero".to_string()));
        }

        // Nothing ingested yet: no embedding or generation round-trips
        if self.store.is_empty() {
            return Ok(QueryOutcome {
                answer: None,
                sources: Vec::new(),
                generation_error: None,
            });
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, top_k)?;

        let sources: Vec<RetrievedSource> = results
            .iter()
            .map(|r| RetrievedSource::from_chunk(&r.chunk, r.similarity))
            .collect();

        if !use_generation || sources.is_empty() {
            return Ok(QueryOutcome {
                answer: None,
                sources,
                generation_error: None,
            });
        }

        let messages = PromptBuilder::build_messages(query, &sources);
        match self.generator.generate(&messages).await {
            Ok(answer) => Ok(QueryOutcome {
                answer: Some(answer),
                sources,
                generation_error: None,
            }),
            Err(e) => {
                // Retrieval succeeded, generation degraded: report and move on
                tracing::error!(
                    error = %e,
                    provider = self.generator.name(),
                    model = self.generator.model(),
                    "answer generation failed; returning retrieval results only"
                );
                Ok(QueryOutcome {
                    answer: Some(GENERATION_DEGRADED_ANSWER.to_string()),
                    sources,
                    generation_error: Some(e.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::DistanceMetric;
    use crate::types::{Chunk, Document, FileFormat, Message};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const DIMS: usize = 4;

    struct StubEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0, 0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            DIMS
        }

        fn model_id(&self) -> &str {
            "stub-embed"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct StubGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GenerationProvider for StubGenerator {
        async fn generate(&self, messages: &[Message]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::generation("stub timeout"));
            }
            assert!(!messages.is_empty());
            Ok("stub answer [Source 1]".to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!self.fail)
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    struct Fixture {
        engine: QueryEngine,
        store: Arc<VectorStore>,
        embedder: Arc<StubEmbedder>,
        generator: Arc<StubGenerator>,
        _dir: TempDir,
    }

    fn fixture(generation_fails: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            VectorStore::open(
                dir.path().join("vector_store.json"),
                "stub-embed",
                DIMS,
                DistanceMetric::Cosine,
            )
            .unwrap(),
        );
        let embedder = Arc::new(StubEmbedder {
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(StubGenerator {
            calls: AtomicUsize::new(0),
            fail: generation_fails,
        });
        let engine = QueryEngine::new(
            Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>,
            Arc::clone(&generator) as Arc<dyn GenerationProvider>,
            Arc::clone(&store),
            5,
        );
        Fixture {
            engine,
            store,
            embedder,
            generator,
            _dir: dir,
        }
    }

    fn seed(store: &VectorStore, contents: &[&str]) {
        let doc = Document::new(
            "seed.txt".to_string(),
            FileFormat::Txt,
            "hash".to_string(),
            contents.join(" "),
            64,
        );
        let batch: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                (
                    Chunk::new(&doc, content.to_string(), i as u32, 0, content.len()),
                    vec![1.0, i as f32 * 0.1, 0.0, 0.0],
                )
            })
            .collect();
        store.add_batch(batch).unwrap();
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid() {
        let f = fixture(false);
        let err = f.engine.answer("   ", None, true).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_zero_top_k_is_invalid() {
        let f = fixture(false);
        let err = f.engine.answer("question", Some(0), true).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_empty_store_skips_embedding_and_generation() {
        let f = fixture(false);
        let outcome = f.engine.answer("anything there?", None, true).await.unwrap();

        assert_eq!(outcome.answer, None);
        assert!(outcome.sources.is_empty());
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_disabled_returns_sources_only() {
        let f = fixture(false);
        seed(&f.store, &["alpha", "beta"]);

        let outcome = f.engine.answer("alpha?", None, false).await.unwrap();
        assert_eq!(outcome.answer, None);
        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_success_keeps_ranked_sources() {
        let f = fixture(false);
        seed(&f.store, &["alpha", "beta", "gamma"]);

        let outcome = f.engine.answer("what is alpha?", Some(2), true).await.unwrap();
        assert_eq!(outcome.answer.as_deref(), Some("stub answer [Source 1]"));
        assert_eq!(outcome.sources.len(), 2);
        assert!(outcome.generation_error.is_none());
        assert!(outcome.sources[0].similarity_score >= outcome.sources[1].similarity_score);
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_without_losing_sources() {
        let f = fixture(true);
        seed(&f.store, &["alpha", "beta"]);

        let outcome = f.engine.answer("what is alpha?", None, true).await.unwrap();
        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(outcome.answer.as_deref(), Some(GENERATION_DEGRADED_ANSWER));
        assert!(outcome.generation_error.unwrap().contains("stub timeout"));
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_top_k_caps_sources() {
        let f = fixture(false);
        seed(&f.store, &["a", "b", "c", "d", "e", "f", "g"]);

        let outcome = f.engine.answer("query", Some(3), false).await.unwrap();
        assert_eq!(outcome.sources.len(), 3);

        // Default top_k applies when the request leaves it unset
        let outcome = f.engine.answer("query", None, false).await.unwrap();
        assert_eq!(outcome.sources.len(), 5);
    }
}
