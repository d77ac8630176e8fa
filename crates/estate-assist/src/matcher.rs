//! Hybrid lexical + semantic filtering of catalog items against a query.

use crate::embeddings::{cosine_similarity, EmbeddingModel};
use crate::normalize::clean_text;
use crate::similarity::partial_ratio;

#[derive(Debug, Clone, Copy)]
pub struct HybridThresholds {
    pub lexical: f64,
    pub semantic: f32,
}

impl Default for HybridThresholds {
    fn default() -> Self {
        Self {
            lexical: 0.65,
            semantic: 0.45,
        }
    }
}

/// Keywords that signal catalog intent even when no item scores above
/// threshold; the full list is then returned so the model can still
/// summarise the inventory.
const DOMAIN_KEYWORDS: &[&str] = &[
    "rent", "rental", "buy", "sale", "price", "property", "properties", "house", "apartment",
    "flat", "villa", "listing", "agent",
];

pub fn has_domain_keyword(query: &str) -> bool {
    let query = query.to_lowercase();
    DOMAIN_KEYWORDS.iter().any(|k| query.contains(k))
}

/// Stable filter: keeps every item whose projected text clears either the
/// lexical partial-ratio threshold or the embedding cosine threshold, in
/// the original order. No ranking.
pub fn hybrid_match<'a, T, F>(
    query: &str,
    items: &'a [T],
    text_fn: F,
    thresholds: HybridThresholds,
    embedder: &dyn EmbeddingModel,
) -> Vec<&'a T>
where
    F: Fn(&T) -> String,
{
    let query = clean_text(query);
    if query.is_empty() || items.is_empty() {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();
    let query_emb = embedder.embed(&query);

    let mut matched = Vec::new();
    for item in items {
        let text = clean_text(&text_fn(item));
        if text.is_empty() {
            continue;
        }

        let lexical = partial_ratio(&query_lower, &text.to_lowercase());
        let semantic = cosine_similarity(&query_emb, &embedder.embed(&text));

        if lexical > thresholds.lexical || semantic > thresholds.semantic {
            matched.push(item);
        }
    }
    matched
}

/// `hybrid_match`, falling back to the full unfiltered list when nothing
/// matched but the query carries a domain keyword.
pub fn hybrid_match_with_fallback<'a, T, F>(
    query: &str,
    items: &'a [T],
    text_fn: F,
    thresholds: HybridThresholds,
    embedder: &dyn EmbeddingModel,
) -> Vec<&'a T>
where
    F: Fn(&T) -> String,
{
    let matched = hybrid_match(query, items, text_fn, thresholds, embedder);
    if matched.is_empty() && has_domain_keyword(query) {
        items.iter().collect()
    } else {
        matched
    }
}
