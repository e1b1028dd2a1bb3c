//! Vector storage and query orchestration

mod engine;
mod store;

pub use engine::{QueryEngine, QueryOutcome};
pub use store::{DistanceMetric, ScoredChunk, StoreStats, VectorStore};
