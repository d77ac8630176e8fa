//! Sentence embeddings for the semantic side of hybrid matching.
//!
//! Backend: `fastembed` wrapping AllMiniLML6V2 (384-dim). A deterministic
//! hash-based stub stands in when `ESTATE_ASSIST_STUB=1` is set or the
//! model fails to load (e.g. no network in CI), so matching degrades to
//! the lexical path instead of failing.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

pub const EMBEDDING_DIM: usize = 384;

/// Embedding backend behind the matcher.
///
/// Implementations must be cheap to call repeatedly: the hybrid matcher
/// embeds the query once and every candidate item once per request.
pub trait EmbeddingModel: Send + Sync {
    /// Embed one text. Must return a vector of `EMBEDDING_DIM` floats.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// `Real` wraps `fastembed::TextEmbedding`. `Stub` returns hash-based
/// vectors for test/offline use.
///
/// `TextEmbedding::embed` requires `&mut self`, so the real variant is
/// kept inside a `Mutex` so the outer `Embedder` can be `Send + Sync`.
pub enum Embedder {
    Real(Mutex<fastembed::TextEmbedding>),
    Stub,
}

impl Embedder {
    /// Initialise the embedder, falling back to the stub when the model
    /// is unavailable.
    pub fn init() -> Self {
        if std::env::var("ESTATE_ASSIST_STUB")
            .map(|v| v == "1")
            .unwrap_or(false)
        {
            tracing::info!("stub embedder active (ESTATE_ASSIST_STUB=1)");
            return Embedder::Stub;
        }

        match fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false),
        ) {
            Ok(te) => {
                tracing::info!("AllMiniLML6V2 embedding model loaded");
                Embedder::Real(Mutex::new(te))
            }
            Err(e) => {
                tracing::warn!("embedding model unavailable ({e}), falling back to stub");
                Embedder::Stub
            }
        }
    }
}

impl EmbeddingModel for Embedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        match self {
            Embedder::Real(mutex) => {
                let mut te = mutex.lock();
                match te.embed(vec![text], None) {
                    Ok(mut embeddings) if !embeddings.is_empty() => embeddings.remove(0),
                    Ok(_) => hash_embed(text),
                    Err(e) => {
                        tracing::warn!("embed error: {e}");
                        hash_embed(text)
                    }
                }
            }
            Embedder::Stub => hash_embed(text),
        }
    }
}

/// Cosine similarity between two vectors; 0.0 when either is all-zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Deterministic 384-dim vector from SHA-256 of text. Stub use only.
fn hash_embed(text: &str) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    (0..EMBEDDING_DIM)
        .map(|i| {
            let byte = digest[i % 32] as f32;
            (byte / 255.0) * 2.0 - 1.0 // normalise to [-1, 1]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_embedding_is_deterministic() {
        let stub = Embedder::Stub;
        let a = stub.embed("two bedroom flat in lekki");
        let b = stub.embed("two bedroom flat in lekki");
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
    }

    #[test]
    fn identical_texts_have_unit_cosine() {
        let stub = Embedder::Stub;
        let a = stub.embed("waterfront duplex");
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-5, "got {sim}");
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zeros = vec![0.0f32; EMBEDDING_DIM];
        let other = Embedder::Stub.embed("anything");
        assert_eq!(cosine_similarity(&zeros, &other), 0.0);
    }
}
