//! Embedding client: batched requests with zero-vector degradation.
//!
//! A failed batch must not abort dataset indexing, so every text in a
//! failed batch is replaced by a zero-vector of the model's known
//! dimensionality. The output therefore always has one vector per input,
//! which the flat index depends on. Embedding deliberately does not
//! retry; zero-vector substitution is the degradation path.

use std::sync::Arc;

use super::provider::ChatProvider;
use crate::core::errors::ApiError;

/// Dimensionality of the embedding model, also used for fallback
/// zero-vectors so the index stays rectangular.
pub const EMBEDDING_DIM: usize = 1536;

const BATCH_SIZE: usize = 10;

#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn ChatProvider>,
    model_id: String,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn ChatProvider>, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
        }
    }

    /// Embed every text, in order. Always returns `texts.len()` vectors.
    pub async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_no, batch) in texts.chunks(BATCH_SIZE).enumerate() {
            let processed: Vec<String> = batch.iter().map(|t| preprocess(t)).collect();

            match self.provider.embed(&processed, &self.model_id).await {
                Ok(batch_embeddings) => embeddings.extend(batch_embeddings),
                Err(err) => {
                    tracing::error!(
                        "embedding batch {} ({} texts) failed, substituting zero-vectors: {}",
                        batch_no + 1,
                        batch.len(),
                        err
                    );
                    for _ in batch {
                        embeddings.push(vec![0.0; EMBEDDING_DIM]);
                    }
                }
            }
        }

        embeddings
    }

    /// Embed a single query text.
    pub async fn embed_one(&self, text: &str) -> Vec<f32> {
        self.embed(std::slice::from_ref(&text.to_string()))
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| vec![0.0; EMBEDDING_DIM])
    }
}

/// Newlines confuse embedding models trained on flat text; collapse them
/// before sending.
fn preprocess(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm::types::ChatRequest;

    /// Returns unit vectors, failing every `fail_nth` batch call.
    struct CountingProvider {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
        dim: usize,
    }

    impl CountingProvider {
        fn new(fail_on: Vec<usize>, dim: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
                dim,
            }
        }
    }

    #[async_trait]
    impl ChatProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            unreachable!("embedding tests never chat")
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                return Err(ApiError::Upstream("rate limited".to_string()));
            }
            Ok(inputs.iter().map(|_| vec![1.0; self.dim]).collect())
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {i}")).collect()
    }

    #[tokio::test]
    async fn output_length_matches_input_length() {
        let provider = Arc::new(CountingProvider::new(vec![], 4));
        let client = EmbeddingClient::new(provider.clone(), "embed-model");

        let out = client.embed(&texts(23)).await;
        assert_eq!(out.len(), 23);
        // 23 texts at a batch size of 10 means three provider calls.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_batch_degrades_to_zero_vectors() {
        // Second batch (texts 10..20) fails.
        let provider = Arc::new(CountingProvider::new(vec![1], 4));
        let client = EmbeddingClient::new(provider, "embed-model");

        let out = client.embed(&texts(25)).await;
        assert_eq!(out.len(), 25);
        assert_eq!(out[0], vec![1.0; 4]);
        assert_eq!(out[10], vec![0.0; EMBEDDING_DIM]);
        assert_eq!(out[19], vec![0.0; EMBEDDING_DIM]);
        assert_eq!(out[20], vec![1.0; 4]);
    }

    #[test]
    fn preprocess_flattens_whitespace() {
        assert_eq!(preprocess("  a\nb\n"), "a b");
    }
}
