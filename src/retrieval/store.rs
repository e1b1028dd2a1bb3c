//! Vector store for chunk storage and nearest-neighbor search
//!
//! An exact scan over insertion-ordered entries behind one `RwLock`. The
//! store is the sole owner of the durable (chunk, vector) records; it is
//! persisted as a single JSON snapshot that also pins the embedding model
//! the vectors were produced with.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Distance metric used for similarity search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity (score is the similarity itself)
    #[default]
    Cosine,
    /// Euclidean distance (score is `1 / (1 + distance)`)
    L2,
}

/// A chunk paired with its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// On-disk snapshot: the entries plus the manifest that pins the embedding
/// model identity. Loading under a different model or dimensionality is
/// refused instead of silently degrading retrieval.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    embedding_model: String,
    dimensions: usize,
    metric: DistanceMetric,
    entries: Vec<StoredEntry>,
}

/// A search hit: the chunk and its similarity score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Read-only store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub total_documents: usize,
}

/// Persistent vector store
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    embedding_model: String,
    dimensions: usize,
    metric: DistanceMetric,
    entries: RwLock<Vec<StoredEntry>>,
}

impl VectorStore {
    /// Open the store at `path`, loading the snapshot if one exists.
    ///
    /// A snapshot recorded under a different embedding model or
    /// dimensionality fails with a configuration error; the operator must
    /// clear and re-ingest after changing models.
    pub fn open(
        path: impl Into<PathBuf>,
        embedding_model: impl Into<String>,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let path = path.into();
        let embedding_model = embedding_model.into();

        let entries = if path.is_file() {
            let raw = std::fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&raw)
                .map_err(|e| Error::vector_store(format!("corrupt snapshot {}: {}", path.display(), e)))?;

            if snapshot.embedding_model != embedding_model {
                return Err(Error::Config(format!(
                    "vector store at {} was built with embedding model '{}' but '{}' is configured; \
                     clear the store before switching models",
                    path.display(),
                    snapshot.embedding_model,
                    embedding_model
                )));
            }
            if snapshot.dimensions != dimensions {
                return Err(Error::Config(format!(
                    "vector store at {} holds {}-dimensional vectors but {} are configured",
                    path.display(),
                    snapshot.dimensions,
                    dimensions
                )));
            }
            if snapshot.metric != metric {
                return Err(Error::Config(format!(
                    "vector store at {} was built with the {:?} metric but {:?} is configured",
                    path.display(),
                    snapshot.metric,
                    metric
                )));
            }

            snapshot.entries
        } else {
            Vec::new()
        };

        tracing::info!(
            path = %path.display(),
            chunks = entries.len(),
            model = %embedding_model,
            "vector store opened"
        );

        Ok(Self {
            path,
            embedding_model,
            dimensions,
            metric,
            entries: RwLock::new(entries),
        })
    }

    /// Append a single (chunk, vector) pair
    pub fn add(&self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        self.add_batch(vec![(chunk, embedding)]).map(|_| ())
    }

    /// Append a batch of (chunk, vector) pairs as one logical unit.
    ///
    /// Every vector is validated before anything is appended, and the
    /// snapshot is replaced atomically, so a failure leaves no partially
    /// visible document.
    pub fn add_batch(&self, batch: Vec<(Chunk, Vec<f32>)>) -> Result<usize> {
        for (_, embedding) in &batch {
            if embedding.len() != self.dimensions {
                return Err(Error::DimensionMismatch {
                    expected: self.dimensions,
                    actual: embedding.len(),
                });
            }
        }

        let added = batch.len();
        let mut entries = self.entries.write();
        let prior_len = entries.len();
        entries.extend(
            batch
                .into_iter()
                .map(|(chunk, embedding)| StoredEntry { chunk, embedding }),
        );

        if let Err(e) = self.persist(&entries) {
            entries.truncate(prior_len);
            return Err(e);
        }

        Ok(added)
    }

    /// Search for the `top_k` nearest chunks.
    ///
    /// Results come back in descending similarity; ties keep insertion
    /// order (the sort is stable over insertion-ordered entries). An empty
    /// store yields an empty result, not an error.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let entries = self.entries.read();
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                similarity: self.score(query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    /// Remove all entries and the on-disk snapshot. Idempotent.
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write();
        entries.clear();

        if self.path.is_file() {
            std::fs::remove_file(&self.path)?;
        }

        Ok(())
    }

    /// Read-only statistics snapshot
    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read();
        let documents: HashSet<_> = entries.iter().map(|e| e.chunk.document_id).collect();
        StoreStats {
            total_chunks: entries.len(),
            total_documents: documents.len(),
        }
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The embedding model this store is pinned to
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Configured vector dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn score(&self, query: &[f32], embedding: &[f32]) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => cosine_similarity(query, embedding),
            DistanceMetric::L2 => {
                let dist = l2_distance(query, embedding);
                1.0 / (1.0 + dist)
            }
        }
    }

    /// Write the snapshot via temp-file rename so a crash mid-write cannot
    /// leave a truncated file behind
    fn persist(&self, entries: &[StoredEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let snapshot = Snapshot {
            embedding_model: self.embedding_model.clone(),
            dimensions: self.dimensions,
            metric: self.metric,
            entries: entries.to_vec(),
        };

        let tmp_path = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string(&snapshot)?;
        std::fs::write(&tmp_path, raw)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

/// Cosine similarity between two equal-length vectors; zero-magnitude
/// vectors score 0.0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Euclidean distance between two equal-length vectors
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, FileFormat};
    use tempfile::TempDir;

    const DIMS: usize = 4;

    fn open_store(dir: &TempDir) -> VectorStore {
        VectorStore::open(
            dir.path().join("vector_store.json"),
            "test-embed",
            DIMS,
            DistanceMetric::Cosine,
        )
        .unwrap()
    }

    fn doc(name: &str) -> Document {
        Document::new(
            name.to_string(),
            FileFormat::Txt,
            "hash".to_string(),
            "text".to_string(),
            4,
        )
    }

    fn chunk(doc: &Document, index: u32, content: &str) -> Chunk {
        Chunk::new(doc, content.to_string(), index, 0, content.chars().count())
    }

    #[test]
    fn test_empty_store_search_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let results = store.search(&[1.0, 0.0, 0.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
        assert_eq!(store.stats(), StoreStats { total_chunks: 0, total_documents: 0 });
    }

    #[test]
    fn test_self_match_is_top_ranked() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        let vector = vec![0.3, 0.5, 0.1, 0.7];
        store.add(chunk(&d, 0, "only chunk"), vector.clone()).unwrap();

        let results = store.search(&vector, 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "only chunk");
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_search_never_exceeds_top_k() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        let batch: Vec<_> = (0..10)
            .map(|i| (chunk(&d, i, &format!("chunk {}", i)), vec![1.0, i as f32, 0.0, 0.0]))
            .collect();
        store.add_batch(batch).unwrap();

        assert_eq!(store.search(&[1.0, 0.0, 0.0, 0.0], 3).unwrap().len(), 3);
        // Fewer than top_k when the store is smaller
        assert_eq!(store.search(&[1.0, 0.0, 0.0, 0.0], 50).unwrap().len(), 10);
    }

    #[test]
    fn test_ranking_is_descending() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        store
            .add_batch(vec![
                (chunk(&d, 0, "far"), vec![0.0, 1.0, 0.0, 0.0]),
                (chunk(&d, 1, "near"), vec![1.0, 0.1, 0.0, 0.0]),
                (chunk(&d, 2, "exact"), vec![1.0, 0.0, 0.0, 0.0]),
            ])
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0, 0.0], 3).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(order, vec!["exact", "near", "far"]);
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        let same = vec![0.5, 0.5, 0.0, 0.0];
        store
            .add_batch(vec![
                (chunk(&d, 0, "first inserted"), same.clone()),
                (chunk(&d, 1, "second inserted"), same.clone()),
            ])
            .unwrap();

        let results = store.search(&same, 2).unwrap();
        assert_eq!(results[0].chunk.content, "first inserted");
        assert_eq!(results[1].chunk.content, "second inserted");
    }

    #[test]
    fn test_dimension_mismatch_on_add() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        let err = store.add(chunk(&d, 0, "bad"), vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: DIMS, actual: 2 }));
        // Nothing was appended
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_batch_with_one_bad_vector_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d = doc("a.txt");

        let err = store
            .add_batch(vec![
                (chunk(&d, 0, "good"), vec![1.0, 0.0, 0.0, 0.0]),
                (chunk(&d, 1, "bad"), vec![1.0]),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert!(store.is_empty());
        assert!(store.search(&[1.0, 0.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_on_query() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let err = store.search(&[1.0], 5).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_stats_count_distinct_documents() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let d1 = doc("a.txt");
        let d2 = doc("b.txt");

        store
            .add_batch(vec![
                (chunk(&d1, 0, "a0"), vec![1.0, 0.0, 0.0, 0.0]),
                (chunk(&d1, 1, "a1"), vec![0.0, 1.0, 0.0, 0.0]),
                (chunk(&d2, 0, "b0"), vec![0.0, 0.0, 1.0, 0.0]),
            ])
            .unwrap();

        assert_eq!(store.stats(), StoreStats { total_chunks: 3, total_documents: 2 });
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = TempDir::new().unwrap();
        let d = doc("a.txt");
        {
            let store = open_store(&dir);
            store
                .add_batch(vec![(chunk(&d, 0, "persisted"), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
        }

        let reopened = open_store(&dir);
        assert_eq!(reopened.len(), 1);
        let results = reopened.search(&[1.0, 0.0, 0.0, 0.0], 1).unwrap();
        assert_eq!(results[0].chunk.content, "persisted");
    }

    #[test]
    fn test_clear_is_idempotent_and_removes_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vector_store.json");
        let d = doc("a.txt");
        {
            let store = open_store(&dir);
            store
                .add_batch(vec![(chunk(&d, 0, "gone"), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
            assert!(path.is_file());

            store.clear().unwrap();
            assert_eq!(store.stats(), StoreStats { total_chunks: 0, total_documents: 0 });
            assert!(!path.is_file());

            // Clearing an already-empty store is not an error
            store.clear().unwrap();
            assert!(store.search(&[1.0, 0.0, 0.0, 0.0], 5).unwrap().is_empty());
        }

        // A restart after clear() must not resurrect cleared data
        let reopened = open_store(&dir);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_reopen_with_different_model_is_refused() {
        let dir = TempDir::new().unwrap();
        let d = doc("a.txt");
        {
            let store = open_store(&dir);
            store
                .add_batch(vec![(chunk(&d, 0, "pinned"), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
        }

        let err = VectorStore::open(
            dir.path().join("vector_store.json"),
            "other-model",
            DIMS,
            DistanceMetric::Cosine,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("test-embed"));
    }

    #[test]
    fn test_reopen_with_different_dimensions_is_refused() {
        let dir = TempDir::new().unwrap();
        let d = doc("a.txt");
        {
            let store = open_store(&dir);
            store
                .add_batch(vec![(chunk(&d, 0, "pinned"), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
        }

        let err = VectorStore::open(
            dir.path().join("vector_store.json"),
            "test-embed",
            8,
            DistanceMetric::Cosine,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_l2_metric_ranks_by_distance() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(
            dir.path().join("l2_store.json"),
            "test-embed",
            DIMS,
            DistanceMetric::L2,
        )
        .unwrap();
        let d = doc("a.txt");

        store
            .add_batch(vec![
                (chunk(&d, 0, "far"), vec![10.0, 0.0, 0.0, 0.0]),
                (chunk(&d, 1, "near"), vec![1.1, 0.0, 0.0, 0.0]),
            ])
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results[0].chunk.content, "near");
        // Self-distance of zero maps to the maximum score of 1.0
        let exact = store.search(&[10.0, 0.0, 0.0, 0.0], 1).unwrap();
        assert!((exact[0].similarity - 1.0).abs() < 1e-5);
    }
}
