//! In-memory vocabulary store implementation.
//!
//! Useful for testing and ephemeral sessions; nothing survives the
//! process.

use super::{
    clamp_limit, normalize_term, AddOutcome, DeleteOutcome, VocabEntry, VocabularyStore,
};
use crate::error::{KotobaError, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::RwLock;

/// In-memory vocabulary store.
pub struct MemoryVocabularyStore {
    entries: RwLock<Vec<VocabEntry>>,
}

impl MemoryVocabularyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVocabularyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VocabularyStore for MemoryVocabularyStore {
    async fn add(
        &self,
        term: &str,
        meaning: &str,
        example: Option<&str>,
    ) -> Result<AddOutcome> {
        let term = term.trim();
        let meaning = meaning.trim();

        if term.is_empty() {
            return Err(KotobaError::InvalidInput("term must not be empty".to_string()));
        }
        if meaning.is_empty() {
            return Err(KotobaError::InvalidInput(
                "meaning must not be empty".to_string(),
            ));
        }

        let normalized = normalize_term(term);
        let mut entries = self.entries.write().unwrap();

        // Holding the write lock makes check-then-insert atomic
        if entries.iter().any(|e| normalize_term(&e.term) == normalized) {
            return Ok(AddOutcome::Duplicate);
        }

        let entry = VocabEntry::new(
            term.to_string(),
            meaning.to_string(),
            example.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
        );
        entries.push(entry.clone());
        Ok(AddOutcome::Added(entry))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<VocabEntry>> {
        let entries = self.entries.read().unwrap();

        // Ties on added_at break toward the later insertion, matching
        // the SQLite backend's rowid tie-break.
        let mut indexed: Vec<(usize, &VocabEntry)> = entries.iter().enumerate().collect();
        indexed.sort_by(|a, b| b.1.added_at.cmp(&a.1.added_at).then(b.0.cmp(&a.0)));

        Ok(indexed
            .into_iter()
            .take(clamp_limit(limit))
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn delete(&self, term: &str) -> Result<DeleteOutcome> {
        let normalized = normalize_term(term);
        let mut entries = self.entries.write().unwrap();

        let initial_len = entries.len();
        entries.retain(|e| normalize_term(&e.term) != normalized);

        if entries.len() < initial_len {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn random_sample(&self, count: usize) -> Result<Vec<VocabEntry>> {
        let entries = self.entries.read().unwrap();

        let mut rng = rand::thread_rng();
        Ok(entries
            .choose_multiple(&mut rng, clamp_limit(count))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let entries = self.entries.read().unwrap();
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basics() {
        let store = MemoryVocabularyStore::new();

        store.add("neko", "kucing", None).await.unwrap();
        let duplicate = store.add("NEKO", "kucing", None).await.unwrap();
        assert!(matches!(duplicate, AddOutcome::Duplicate));

        assert_eq!(store.count().await.unwrap(), 1);

        assert_eq!(store.delete("neko").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete("neko").await.unwrap(), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_list_recent_breaks_timestamp_ties_by_insertion() {
        let store = MemoryVocabularyStore::new();

        // Same timestamp on every entry; ordering must fall back to
        // insertion order, newest insertion first
        let stamp = chrono::Utc::now();
        {
            let mut entries = store.entries.write().unwrap();
            for (term, meaning) in [("ichi", "satu"), ("ni", "dua"), ("san", "tiga")] {
                let mut entry =
                    VocabEntry::new(term.to_string(), meaning.to_string(), None);
                entry.added_at = stamp;
                entries.push(entry);
            }
        }

        let listed = store.list_recent(10).await.unwrap();
        let terms: Vec<_> = listed.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["san", "ni", "ichi"]);
    }

    #[tokio::test]
    async fn test_memory_sample_without_replacement() {
        let store = MemoryVocabularyStore::new();

        for (term, meaning) in [("ichi", "satu"), ("ni", "dua"), ("san", "tiga")] {
            store.add(term, meaning, None).await.unwrap();
        }

        let sample = store.random_sample(5).await.unwrap();
        assert_eq!(sample.len(), 3);

        let mut terms: Vec<_> = sample.iter().map(|e| e.term.clone()).collect();
        terms.sort_unstable();
        terms.dedup();
        assert_eq!(terms.len(), 3);
    }
}
