//! Nearest-neighbor index over the dictionary corpus.
//!
//! Built once at startup; lookups are read-only and deterministic for
//! an unchanged index and query. The index is never rebuilt mid-session.

use super::{cosine_similarity, DictionaryEntry, DictionaryMatch};
use crate::embedding::Embedder;
use crate::error::{KotobaError, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// In-memory retrieval index over dictionary entries.
pub struct DictionaryIndex {
    entries: Vec<DictionaryEntry>,
    embeddings: Vec<Vec<f32>>,
}

impl DictionaryIndex {
    /// Build the index by embedding every corpus entry.
    ///
    /// This is a startup operation; per-turn lookups only read the
    /// result.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn build(entries: Vec<DictionaryEntry>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if entries.is_empty() {
            return Err(KotobaError::Dictionary(
                "Dictionary corpus is empty".to_string(),
            ));
        }

        let texts: Vec<String> = entries.iter().map(|e| e.embedding_text()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != entries.len() {
            return Err(KotobaError::Dictionary(format!(
                "Embedding count mismatch: {} entries, {} embeddings",
                entries.len(),
                embeddings.len()
            )));
        }

        info!("Built dictionary index over {} entries", entries.len());
        Ok(Self {
            entries,
            embeddings,
        })
    }

    /// Rank entries against a query embedding.
    ///
    /// Results are sorted by score descending; ties keep corpus order so
    /// the same query always yields the same ranking. Entries below
    /// `min_score` are dropped; a fully-filtered result is "not found",
    /// not an error.
    #[instrument(skip(self, query_embedding))]
    pub fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Vec<DictionaryMatch> {
        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, emb)| (i, cosine_similarity(query_embedding, emb)))
            .filter(|(_, score)| *score >= min_score)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);

        debug!("Dictionary lookup matched {} entries", scored.len());

        scored
            .into_iter()
            .map(|(i, score)| DictionaryMatch {
                entry: self.entries[i].clone(),
                score,
            })
            .collect()
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::test_support::StaticEmbedder;
    use std::collections::HashMap;

    fn corpus() -> Vec<DictionaryEntry> {
        vec![
            DictionaryEntry {
                term: "頑張って".to_string(),
                reading: Some("がんばって".to_string()),
                meaning: "semangat".to_string(),
                example: None,
            },
            DictionaryEntry {
                term: "猫".to_string(),
                reading: Some("ねこ".to_string()),
                meaning: "kucing".to_string(),
                example: None,
            },
        ]
    }

    fn embedder_for(entries: &[DictionaryEntry]) -> Arc<StaticEmbedder> {
        let mut vectors = HashMap::new();
        vectors.insert(entries[0].embedding_text(), vec![1.0, 0.0, 0.0]);
        vectors.insert(entries[1].embedding_text(), vec![0.0, 1.0, 0.0]);
        vectors.insert("頑張って".to_string(), vec![0.95, 0.05, 0.0]);
        // Unknown queries land orthogonal to everything in the corpus
        Arc::new(StaticEmbedder::new(vectors, vec![0.0, 0.0, 1.0]))
    }

    #[tokio::test]
    async fn test_exact_term_matches_above_threshold() {
        let entries = corpus();
        let embedder = embedder_for(&entries);
        let index = DictionaryIndex::build(entries, embedder.clone()).await.unwrap();

        let query = embedder.embed("頑張って").await.unwrap();
        let matches = index.search(&query, 3, 0.5);

        assert!(!matches.is_empty());
        assert_eq!(matches[0].entry.term, "頑張って");
        assert_eq!(matches[0].entry.meaning, "semangat");
        assert!(matches[0].score > 0.5);
    }

    #[tokio::test]
    async fn test_unknown_query_is_not_found() {
        let entries = corpus();
        let embedder = embedder_for(&entries);
        let index = DictionaryIndex::build(entries, embedder.clone()).await.unwrap();

        let query = embedder.embed("zzzznotaword").await.unwrap();
        let matches = index.search(&query, 3, 0.5);
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_deterministic() {
        let entries = corpus();
        let embedder = embedder_for(&entries);
        let index = DictionaryIndex::build(entries, embedder.clone()).await.unwrap();

        let query = embedder.embed("頑張って").await.unwrap();
        let first: Vec<String> = index
            .search(&query, 3, 0.0)
            .into_iter()
            .map(|m| m.entry.term)
            .collect();
        let second: Vec<String> = index
            .search(&query, 3, 0.0)
            .into_iter()
            .map(|m| m.entry.term)
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_corpus_rejected() {
        let embedder = embedder_for(&corpus());
        let result = DictionaryIndex::build(Vec::new(), embedder).await;
        assert!(result.is_err());
    }
}
