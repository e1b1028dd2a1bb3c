//! Core data types

pub mod document;
pub mod message;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, Document, FileFormat};
pub use message::{Message, Role};
pub use query::QueryRequest;
pub use response::{
    ClearResponse, QueryResponse, RetrievedSource, StatusResponse, UploadResponse,
};
