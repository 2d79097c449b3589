use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// A chat-completion + embedding backend.
///
/// One provider instance serves both halves of the pipeline; the
/// higher-level clients (`GenerationClient`, `EmbeddingClient`) decide
/// retry and degradation policy on top of this raw transport.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging (e.g. "openai").
    fn name(&self) -> &str;

    /// Chat completion (non-streaming).
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// Generate one embedding per input, in input order.
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
