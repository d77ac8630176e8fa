//! Static FAQ corpus: loading, lexical matching, page augmentation.
//!
//! The corpus is loaded once at startup and immutable afterwards. Matching
//! is the lexical revision: full edit-distance ratio against each stored
//! question, accepted above `FAQ_MATCH_THRESHOLD`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::normalize::clean_text;
use crate::similarity::ratio;

/// Acceptance threshold for a FAQ match (lexical full ratio).
pub const FAQ_MATCH_THRESHOLD: f64 = 0.60;

/// Longest answer kept when augmenting the corpus from a scraped page.
const PAGE_ANSWER_CAP: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default)]
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
}

impl FaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// Load the corpus from a JSON file: either a bare array of
    /// `{question, answer}` objects or an object with a `faqs` key
    /// wrapping that array.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read FAQ file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("FAQ file is not valid JSON")?;
        let raw = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("faqs") {
                Some(Value::Array(items)) => items,
                _ => bail!("FAQ object must contain a `faqs` array"),
            },
            _ => bail!("FAQ file must be an array or an object with a `faqs` key"),
        };

        // Entries with a missing or empty question can never match; drop
        // them at load instead of re-checking on every query.
        let entries: Vec<FaqEntry> = raw
            .into_iter()
            .filter_map(|v| serde_json::from_value::<FaqEntry>(v).ok())
            .filter(|e| !e.question.trim().is_empty())
            .collect();

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Best-scoring FAQ for `query`, or `None` when nothing clears
    /// `threshold`. Case-insensitive; strict greater-than comparison, so
    /// the first entry encountered retains priority on ties.
    pub fn best_match(&self, query: &str, threshold: f64) -> Option<&FaqEntry> {
        let query = clean_text(query).to_lowercase();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<&FaqEntry> = None;
        let mut best_score = 0.0f64;
        for entry in &self.entries {
            let score = ratio(&query, &entry.question.to_lowercase());
            if score > best_score {
                best_score = score;
                best = Some(entry);
            }
        }

        if best_score > threshold {
            best
        } else {
            None
        }
    }

    /// Append scraped static-page content (about-us, contact, …) as a
    /// synthetic Q/A entry, answer capped at 1000 chars.
    pub fn augment_page(&mut self, page_name: &str, content: &str) {
        let answer: String = content.trim().chars().take(PAGE_ANSWER_CAP).collect();
        if answer.is_empty() {
            return;
        }
        self.entries.push(FaqEntry {
            question: format!(
                "What information can I find on the {} page?",
                page_name.replace('_', " ")
            ),
            answer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FaqIndex {
        FaqIndex::new(vec![
            FaqEntry {
                question: "How do I list my property?".into(),
                answer: "Use the listing form in your dashboard.".into(),
            },
            FaqEntry {
                question: "What are the agent fees?".into(),
                answer: "Agents charge a 5% commission.".into(),
            },
        ])
    }

    #[test]
    fn parses_bare_array() {
        let index =
            FaqIndex::from_json(r#"[{"question": "Q1", "answer": "A1"}]"#).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].answer, "A1");
    }

    #[test]
    fn parses_faqs_envelope() {
        let index =
            FaqIndex::from_json(r#"{"faqs": [{"question": "Q1", "answer": "A1"}]}"#).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rejects_unexpected_shape() {
        assert!(FaqIndex::from_json(r#""just a string""#).is_err());
        assert!(FaqIndex::from_json(r#"{"other": []}"#).is_err());
    }

    #[test]
    fn drops_entries_without_question() {
        let index = FaqIndex::from_json(
            r#"[{"question": "", "answer": "A"}, {"question": "Q", "answer": "A"}]"#,
        )
        .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn exact_question_matches() {
        let index = sample();
        let hit = index
            .best_match("How do I list my property?", FAQ_MATCH_THRESHOLD)
            .expect("exact question should match");
        assert_eq!(hit.answer, "Use the listing form in your dashboard.");
    }

    #[test]
    fn unrelated_query_returns_none() {
        let index = sample();
        assert!(index
            .best_match("tell me a joke about penguins", FAQ_MATCH_THRESHOLD)
            .is_none());
    }

    #[test]
    fn empty_query_returns_none() {
        let index = sample();
        assert!(index.best_match("   ", FAQ_MATCH_THRESHOLD).is_none());
    }

    #[test]
    fn tie_break_keeps_first_entry() {
        let index = FaqIndex::new(vec![
            FaqEntry {
                question: "same question".into(),
                answer: "first".into(),
            },
            FaqEntry {
                question: "same question".into(),
                answer: "second".into(),
            },
        ]);
        let hit = index.best_match("same question", FAQ_MATCH_THRESHOLD).unwrap();
        assert_eq!(hit.answer, "first");
    }

    #[test]
    fn empty_index_never_matches() {
        let index = FaqIndex::default();
        assert!(index.best_match("anything at all", FAQ_MATCH_THRESHOLD).is_none());
    }

    #[test]
    fn augment_page_caps_answer_and_names_page() {
        let mut index = FaqIndex::default();
        index.augment_page("about_us", &"x".repeat(2000));
        assert_eq!(index.len(), 1);
        let entry = &index.entries()[0];
        assert_eq!(
            entry.question,
            "What information can I find on the about us page?"
        );
        assert_eq!(entry.answer.chars().count(), 1000);
    }
}
