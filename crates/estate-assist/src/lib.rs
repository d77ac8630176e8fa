pub mod catalog;
pub mod config;
pub mod context;
pub mod embeddings;
pub mod engine;
pub mod faq;
pub mod history;
pub mod llm;
pub mod matcher;
pub mod normalize;
pub mod similarity;

// Re-export primary types for convenience
pub use catalog::{CachedCatalog, CatalogSnapshot, CatalogSource, HttpCatalogClient};
pub use config::{AssistConfig, CatalogConfig, LlmConfig, MatchingConfig};
pub use embeddings::{Embedder, EmbeddingModel};
pub use engine::ChatEngine;
pub use faq::{FaqEntry, FaqIndex};
pub use history::{ChatTurn, InMemorySessionStore, SessionStore};
pub use llm::{ChatMessage, LlmProvider, OpenAiCompatProvider};

// Re-export common types
pub use anyhow::{Error, Result};
