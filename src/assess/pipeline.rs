//! End-to-end assessment pipeline.
//!
//! One `PipelineSession` owns the provider stack and the retrieval pool
//! for a dataset selection. Each run is a strictly sequential chain:
//! embed → retrieve → predict hazard → score risk → grade → generate
//! improvement → compute reduction → translate. Cancellation is checked
//! before every provider call; stages are otherwise independent.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::assess::grading::{grade_of, reduction_rate};
use crate::assess::parsers::{parse_improvement_output, parse_risk_output};
use crate::assess::prompts::{hazard_prompt, improvement_prompt, risk_prompt};
use crate::assess::types::{Assessment, AssessmentResult, RetrievedCase};
use crate::core::cancel::CancellationToken;
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::core::language::Language;
use crate::dataset;
use crate::llm::generation::system_persona;
use crate::llm::{ChatProvider, EmbeddingClient, GenerationClient, OpenAiProvider, Translator};
use crate::retrieval::RetrievalPool;

pub struct PipelineSession {
    data_dir: PathBuf,
    working_language: Language,
    retrieval: crate::core::config::RetrievalConfig,
    generation: GenerationClient,
    embedder: EmbeddingClient,
    translator: Translator,
    pool: Option<RetrievalPool>,
}

impl PipelineSession {
    /// Build a session against the configured OpenAI-compatible API.
    pub fn new(config: &AppConfig, api_key: &str) -> Result<PipelineSession, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::BadRequest("an API key is required".to_string()));
        }
        let provider = Arc::new(OpenAiProvider::new(
            &config.api_base_url,
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )?);
        Ok(Self::with_provider(provider, config))
    }

    /// Build a session over any provider implementation. This is the
    /// seam the tests drive scripted providers through.
    pub fn with_provider(provider: Arc<dyn ChatProvider>, config: &AppConfig) -> PipelineSession {
        let generation = GenerationClient::new(
            provider.clone(),
            config.chat_model.clone(),
            config.generation.clone(),
        );
        let embedder = EmbeddingClient::new(provider, config.embedding_model.clone());
        let translator = Translator::new(generation.clone(), config.working_language);

        PipelineSession {
            data_dir: config.data_dir.clone(),
            working_language: config.working_language,
            retrieval: config.retrieval.clone(),
            generation,
            embedder,
            translator,
            pool: None,
        }
    }

    pub fn pool(&self) -> Option<&RetrievalPool> {
        self.pool.as_ref()
    }

    /// Load a dataset and rebuild the retrieval pool over it. The old
    /// pool stays in place until the new one is fully built, so a
    /// failed load never leaves a half-indexed session behind.
    pub async fn load_dataset(&mut self, name: &str) -> Result<usize, ApiError> {
        let records = dataset::load_dataset(&self.data_dir, name)?;
        let pool = RetrievalPool::build(name, records, &self.embedder).await?;
        let count = pool.len();
        self.pool = Some(pool);
        tracing::info!("retrieval pool rebuilt over dataset '{}' ({} records)", name, count);
        Ok(count)
    }

    /// Run one full assessment for a work-activity description.
    pub async fn run_assessment(
        &self,
        activity: &str,
        output_language: Language,
        cancel: &CancellationToken,
    ) -> Result<Assessment, ApiError> {
        // Local preconditions first; no network is touched for bad input.
        let activity = activity.trim();
        if activity.is_empty() {
            return Err(ApiError::BadRequest(
                "activity description must not be empty".to_string(),
            ));
        }
        let pool = self.pool.as_ref().ok_or_else(|| {
            ApiError::BadRequest("load a dataset before running an assessment".to_string())
        })?;

        let lang = self.working_language;
        let persona = system_persona(lang);

        // Stage 1: retrieve similar historical cases.
        cancel.check()?;
        let query_embedding = self.embedder.embed_one(activity).await;
        let retrieved = pool.retrieve(&query_embedding, self.retrieval.hazard_top_k)?;
        let similar: Vec<RetrievedCase> =
            retrieved.iter().map(RetrievedCase::from_retrieved).collect();
        let confidence = confidence_score(&similar);

        // Stage 2: predict the hazard.
        cancel.check()?;
        let prompt = hazard_prompt(&retrieved, activity, lang, self.retrieval.hazard_top_k);
        let hazard = self.generation.generate(&prompt, persona).await?;
        if hazard.trim().is_empty() {
            return Err(ApiError::Upstream(
                "model returned an empty hazard prediction".to_string(),
            ));
        }

        // Stage 3: score the risk. A parse failure here is surfaced, not
        // papered over with fabricated numbers.
        cancel.check()?;
        let prompt = risk_prompt(&retrieved, activity, &hazard, lang, self.retrieval.risk_examples);
        let risk_text = self.generation.generate(&prompt, persona).await?;
        let score = parse_risk_output(&risk_text, lang)?;
        let grade = grade_of(score.t);

        // Stage 4: generate improvement measures against records similar
        // to the activity/hazard pair. Best-effort: failures degrade to
        // the default plan.
        cancel.check()?;
        let improvement_query = format!("{activity} {hazard}");
        let improvement_embedding = self.embedder.embed_one(&improvement_query).await;
        let improvement_retrieved =
            pool.retrieve(&improvement_embedding, self.retrieval.improvement_top_k)?;

        cancel.check()?;
        let prompt = improvement_prompt(
            &improvement_retrieved,
            activity,
            &hazard,
            score.frequency,
            score.intensity,
            score.t,
            lang,
            self.retrieval.improvement_examples,
        );
        let improvement_text = match self.generation.generate(&prompt, persona).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("improvement generation failed, using default plan: {}", err);
                String::new()
            }
        };
        let outcome = parse_improvement_output(&improvement_text, lang);
        let improved_grade = grade_of(outcome.improved_t);
        let risk_reduction_rate = outcome
            .reduction_rate
            .unwrap_or_else(|| reduction_rate(score.t, outcome.improved_t));

        // Stage 5: localize the caller-facing text fields.
        cancel.check()?;
        let hazard = self.translator.translate(&hazard, output_language).await;
        let plan = self.translator.translate(&outcome.plan, output_language).await;

        Ok(Assessment {
            result: AssessmentResult {
                activity: activity.to_string(),
                hazard,
                frequency: score.frequency,
                intensity: score.intensity,
                risk_score: score.t,
                grade,
                improvement_plan: plan,
                improved_frequency: outcome.improved_frequency,
                improved_intensity: outcome.improved_intensity,
                improved_risk_score: outcome.improved_t,
                improved_grade,
                risk_reduction_rate,
                output_language,
            },
            similar,
            confidence,
        })
    }
}

/// Display-only retrieval confidence: mean of the hits' `1/(1+d)`
/// similarity as a percentage, capped at 100.
pub fn confidence_score(similar: &[RetrievedCase]) -> f64 {
    if similar.is_empty() {
        return 0.0;
    }
    let avg = similar.iter().map(|c| c.confidence as f64).sum::<f64>() / similar.len() as f64;
    ((avg * 100.0).min(100.0) * 10.0).round() / 10.0
}
