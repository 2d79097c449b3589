//! Application configuration.
//!
//! Loaded once at startup from an optional `gantry.toml` next to the
//! working directory, with environment overrides for the values that
//! should never live in a checked-in file (API key, base URL).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::core::language::Language;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenAI-compatible API base, without a trailing slash.
    pub api_base_url: String,
    /// API key; normally supplied via `OPENAI_API_KEY` or per request.
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    /// Per-call HTTP timeout for provider requests.
    pub request_timeout_secs: u64,
    /// Directory searched for dataset CSV files.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Language the pipeline computes in.
    pub working_language: Language,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com".to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            request_timeout_secs: 30,
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            working_language: Language::English,
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_tokens: u32,
    /// Total attempts per generation call, first try included.
    pub max_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 600,
            max_attempts: 3,
            retry_base_delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Neighbors retrieved for hazard prediction.
    pub hazard_top_k: usize,
    /// Few-shot examples included in the risk-scoring prompt.
    pub risk_examples: usize,
    /// Neighbors retrieved for improvement generation.
    pub improvement_top_k: usize,
    /// Few-shot examples included in the improvement prompt.
    pub improvement_examples: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            hazard_top_k: 5,
            risk_examples: 3,
            improvement_top_k: 3,
            improvement_examples: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` if it exists, falling back to
    /// defaults, then apply environment overrides.
    pub fn load(path: &Path) -> Result<AppConfig, ApiError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(ApiError::internal)?;
            toml::from_str(&raw)
                .map_err(|e| ApiError::BadRequest(format!("invalid config file: {e}")))?
        } else {
            AppConfig::default()
        };

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(base) = std::env::var("GANTRY_API_BASE") {
            if !base.is_empty() {
                config.api_base_url = base;
            }
        }
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.retrieval.hazard_top_k, 5);
        assert_eq!(config.working_language, Language::English);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("does-not-exist.toml")).expect("load");
        assert_eq!(config.chat_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "chat_model = \"gpt-4o\"\n[generation]\nmax_tokens = 700"
        )
        .expect("write");

        let config = AppConfig::load(file.path()).expect("load");
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.generation.max_tokens, 700);
        // Untouched values keep their defaults.
        assert_eq!(config.generation.max_attempts, 3);
    }
}
