//! Runtime configuration, read from the process environment at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    pub faq_path: PathBuf,
    pub llm: LlmConfig,
    pub catalog: CatalogConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// May be empty; the provider then fails each call and the engine
    /// degrades to its fallback reply instead of refusing to start.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub properties_url: String,
    pub agents_url: String,
    pub blogs_url: String,
    /// Catalog snapshots older than this are refetched.
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// FAQ acceptance threshold (lexical full ratio).
    pub faq_threshold: f64,
    /// Hybrid matcher lexical partial-ratio threshold.
    pub lexical_threshold: f64,
    /// Hybrid matcher embedding cosine threshold.
    pub semantic_threshold: f32,
    /// Listings summarised in the assembled context, at most.
    pub max_context_items: usize,
    /// Rolling chat turns kept per session.
    pub history_cap: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            faq_threshold: 0.60,
            lexical_threshold: 0.65,
            semantic_threshold: 0.45,
            max_context_items: 10,
            history_cap: 6,
        }
    }
}

impl AssistConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            faq_path: PathBuf::from(env_or("FAQ_PATH", "faqs.json")),
            llm: LlmConfig {
                api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
                base_url: env_or("LLM_BASE_URL", "https://openrouter.ai/api/v1"),
                model: env_or("LLM_MODEL", "google/gemma-2-9b-it"),
            },
            catalog: CatalogConfig {
                properties_url: require("PROPERTIES_API_URL")?,
                agents_url: require("AGENTS_API_URL")?,
                blogs_url: require("BLOGS_API_URL")?,
                ttl_secs: env_or("CATALOG_TTL_SECS", "60")
                    .parse()
                    .map_err(|_| ConfigError::Invalid("CATALOG_TTL_SECS must be an integer".into()))?,
            },
            matching: MatchingConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject clearly broken configurations before the engine is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.base_url must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.matching.faq_threshold) {
            return Err(ConfigError::Invalid(
                "matching.faq_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matching.lexical_threshold) {
            return Err(ConfigError::Invalid(
                "matching.lexical_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matching.semantic_threshold) {
            return Err(ConfigError::Invalid(
                "matching.semantic_threshold must be in [0.0, 1.0]".into(),
            ));
        }
        if self.matching.max_context_items == 0 {
            return Err(ConfigError::Invalid(
                "matching.max_context_items must be > 0".into(),
            ));
        }
        if self.matching.history_cap == 0 {
            return Err(ConfigError::Invalid("matching.history_cap must be > 0".into()));
        }
        Ok(())
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(var))
}
