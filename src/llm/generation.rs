//! Generation client: chat completion with retry and backoff.
//!
//! Generation is the one provider path that retries; embedding failures
//! degrade to zero-vectors instead (see `embedding.rs`).

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use super::provider::ChatProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::GenerationConfig;
use crate::core::errors::ApiError;
use crate::core::language::Language;

/// Fixed assessment persona, per language.
pub fn system_persona(language: Language) -> &'static str {
    match language {
        Language::Korean => {
            "위험성 평가 및 개선대책 생성을 돕는 전문 도우미입니다. \
             정확하고 구체적인 안전 관리 조치를 제안합니다."
        }
        Language::English => {
            "I am a professional assistant helping with risk assessment and \
             improvement measures. I provide accurate and specific safety \
             management recommendations."
        }
        Language::Chinese => "我是一个协助进行风险评估和改进措施的专业助手。我提供准确和具体的安全管理建议。",
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn ChatProvider>,
    model_id: String,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        model_id: impl Into<String>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            config,
        }
    }

    /// Run one chat completion with the configured temperature and output
    /// cap, retrying transport failures with exponential backoff plus
    /// jitter. Exhausted retries surface the last provider error.
    pub async fn generate(&self, prompt: &str, system_role: &str) -> Result<String, ApiError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(system_role),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let attempts = self.config.max_attempts.max(1);
        let mut last_err = ApiError::Upstream("no attempts made".to_string());

        for attempt in 1..=attempts {
            match self.provider.chat(request.clone(), &self.model_id).await {
                Ok(content) => return Ok(content),
                Err(err) => {
                    tracing::warn!(
                        "generation attempt {}/{} via '{}' failed: {}",
                        attempt,
                        attempts,
                        self.provider.name(),
                        err
                    );
                    last_err = err;
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(last_err)
    }

    /// Exponential backoff with jitter so stacked clients don't retry in
    /// lockstep against a struggling provider.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base_delay_ms;
        let exp = base.saturating_mul(1_u64 << (attempt - 1).min(8));
        let jitter = if base > 0 {
            rand::rng().random_range(0..base)
        } else {
            0
        };
        Duration::from_millis(exp + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `fail_count` calls, then echoes a canned reply.
    struct FlakyProvider {
        calls: AtomicUsize,
        fail_count: usize,
        reply: String,
    }

    impl FlakyProvider {
        fn new(fail_count: usize, reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_count,
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_count {
                Err(ApiError::Upstream("connection reset".to_string()))
            } else {
                Ok(self.reply.clone())
            }
        }

        async fn embed(
            &self,
            _inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            unreachable!("generation tests never embed")
        }
    }

    fn test_config() -> GenerationConfig {
        GenerationConfig {
            retry_base_delay_ms: 0,
            ..GenerationConfig::default()
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let provider = Arc::new(FlakyProvider::new(2, "recovered"));
        let client = GenerationClient::new(provider.clone(), "test-model", test_config());

        let out = client.generate("prompt", "role").await.expect("generate");
        assert_eq!(out, "recovered");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let provider = Arc::new(FlakyProvider::new(10, "never"));
        let client = GenerationClient::new(provider.clone(), "test-model", test_config());

        let err = client.generate("prompt", "role").await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}
