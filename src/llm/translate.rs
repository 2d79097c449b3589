//! Final-output localization.
//!
//! Translation is a presentation nicety: the pipeline computes in its
//! working language and only the caller-facing text fields pass through
//! here. Failures return the untranslated text.

use super::generation::GenerationClient;
use crate::core::language::Language;

#[derive(Clone)]
pub struct Translator {
    generation: GenerationClient,
    working_language: Language,
}

impl Translator {
    pub fn new(generation: GenerationClient, working_language: Language) -> Self {
        Self {
            generation,
            working_language,
        }
    }

    /// Translate `text` into `target`. Identity when the target is the
    /// working language; original text on any provider failure.
    pub async fn translate(&self, text: &str, target: Language) -> String {
        if target == self.working_language || text.trim().is_empty() {
            return text.to_string();
        }

        let system_role = format!(
            "You are a professional translator for construction safety documents. \
             Translate the user's text into {target}. Keep numbering and line \
             structure intact. Output only the translation."
        );

        match self.generation.generate(text, &system_role).await {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => {
                tracing::warn!("translation returned empty output, keeping original text");
                text.to_string()
            }
            Err(err) => {
                tracing::warn!("translation to {} failed, keeping original text: {}", target, err);
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::core::config::GenerationConfig;
    use crate::core::errors::ApiError;
    use crate::llm::provider::ChatProvider;
    use crate::llm::types::ChatRequest;

    struct ScriptedProvider {
        calls: AtomicUsize,
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .map_err(|_| ApiError::Upstream("unavailable".to_string()))
        }

        async fn embed(
            &self,
            _inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            unreachable!()
        }
    }

    fn translator(reply: Result<String, ()>) -> (Translator, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
            reply,
        });
        let generation = GenerationClient::new(
            provider.clone(),
            "test-model",
            GenerationConfig {
                retry_base_delay_ms: 0,
                ..GenerationConfig::default()
            },
        );
        (Translator::new(generation, Language::English), provider)
    }

    #[tokio::test]
    async fn same_language_short_circuits_without_network() {
        let (translator, provider) = translator(Ok("ignored".to_string()));
        let out = translator.translate("fall hazard", Language::English).await;
        assert_eq!(out, "fall hazard");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_returns_original_text() {
        let (translator, _) = translator(Err(()));
        let out = translator.translate("fall hazard", Language::Korean).await;
        assert_eq!(out, "fall hazard");
    }

    #[tokio::test]
    async fn success_returns_translation() {
        let (translator, _) = translator(Ok("추락 위험".to_string()));
        let out = translator.translate("fall hazard", Language::Korean).await;
        assert_eq!(out, "추락 위험");
    }
}
