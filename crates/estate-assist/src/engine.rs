//! Chat orchestration: FAQ match, catalog retrieval, context assembly and
//! the LLM call, as one pipeline that never returns an error to the
//! caller. Every failure degrades to a user-safe reply and a log line.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{property_search_text, CachedCatalog, CatalogSource};
use crate::config::AssistConfig;
use crate::context::{assemble_context, ContextInput};
use crate::embeddings::EmbeddingModel;
use crate::faq::FaqIndex;
use crate::history::{ChatTurn, SessionStore};
use crate::llm::{ChatMessage, LlmProvider};
use crate::matcher::{hybrid_match_with_fallback, HybridThresholds};
use crate::normalize::clean_text;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant for a real estate platform. \
Use the FAQ answer and listing context when they are relevant, and answer concisely.";

/// Fixed reply for empty input; returned before any external call.
pub const EMPTY_QUERY_REPLY: &str = "Please enter a question.";

/// Fallback when the LLM call fails for any reason.
pub const LLM_FAILURE_REPLY: &str =
    "Error communicating with the AI model. Please try again later.";

pub struct ChatEngine {
    faqs: FaqIndex,
    catalog: CachedCatalog,
    embedder: Arc<dyn EmbeddingModel>,
    llm: Arc<dyn LlmProvider>,
    sessions: Arc<dyn SessionStore>,
    faq_threshold: f64,
    thresholds: HybridThresholds,
    max_context_items: usize,
}

impl ChatEngine {
    pub fn new(
        faqs: FaqIndex,
        catalog: Arc<dyn CatalogSource>,
        embedder: Arc<dyn EmbeddingModel>,
        llm: Arc<dyn LlmProvider>,
        sessions: Arc<dyn SessionStore>,
        config: &AssistConfig,
    ) -> Self {
        if faqs.is_empty() {
            tracing::warn!("FAQ index is empty; FAQ matching will never produce a result");
        }
        Self {
            faqs,
            catalog: CachedCatalog::new(catalog, Duration::from_secs(config.catalog.ttl_secs)),
            embedder,
            llm,
            sessions,
            faq_threshold: config.matching.faq_threshold,
            thresholds: HybridThresholds {
                lexical: config.matching.lexical_threshold,
                semantic: config.matching.semantic_threshold,
            },
            max_context_items: config.matching.max_context_items,
        }
    }

    /// Process one user message. Infallible to the caller: input errors,
    /// upstream failures and malformed payloads all map to fixed replies.
    pub async fn handle_message(&self, session_id: &str, message: &str) -> String {
        let query = clean_text(message);
        if query.is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        // 1. FAQ match + catalog retrieval
        let faq = self.faqs.best_match(&query, self.faq_threshold);
        let snapshot = self.catalog.snapshot().await;
        let matched = hybrid_match_with_fallback(
            &query,
            &snapshot.properties,
            property_search_text,
            self.thresholds,
            self.embedder.as_ref(),
        );
        tracing::debug!(
            session_id = %session_id,
            faq_matched = faq.is_some(),
            listings = matched.len(),
            "retrieval complete"
        );

        // 2. Assemble the bounded context block
        let history = self.sessions.history(session_id);
        let context = assemble_context(&ContextInput {
            faq,
            matched_properties: &matched,
            total_properties: snapshot.properties.len(),
            agents: &snapshot.agents,
            blogs: &snapshot.blogs,
            history: &history,
            max_items: self.max_context_items,
        });

        // 3. System instruction, replayed history, then the new turn
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        for turn in &history {
            messages.push(ChatMessage::user(turn.user.clone()));
            messages.push(ChatMessage::assistant(turn.bot.clone()));
        }
        messages.push(ChatMessage::user(format!(
            "User asked: {query}\n\nContext:\n{context}"
        )));

        // 4. LLM call; failures degrade to the fixed fallback
        let reply = match self.llm.chat(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "LLM call failed");
                return LLM_FAILURE_REPLY.to_string();
            }
        };

        // 5. Only successful turns enter the rolling history
        self.sessions
            .append(session_id, ChatTurn::new(query, reply.clone()));
        reply
    }
}
