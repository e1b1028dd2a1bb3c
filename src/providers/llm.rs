//! Generation provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// Trait for hosted LLM answer generation
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate an answer from a prepared conversation (system instruction
    /// plus the user turn carrying context and question)
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Check whether the hosted API is reachable and the credential works
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
