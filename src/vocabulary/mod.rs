//! Personal vocabulary store for Kotoba.
//!
//! Provides a trait-based interface over durable (SQLite) and in-memory
//! backends. Entries are unique per normalized term; insertion of a
//! duplicate is a reported no-op, never an error.

mod memory;
mod sqlite;

pub use memory::MemoryVocabularyStore;
pub use sqlite::SqliteVocabularyStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of entries a single listing may return.
pub const MAX_LIST_LIMIT: usize = 100;

/// A vocabulary entry saved by the learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Unique entry ID.
    pub id: Uuid,
    /// The term as the learner wrote it (e.g. 綺麗).
    pub term: String,
    /// Meaning in the learner's language.
    pub meaning: String,
    /// Optional example sentence.
    pub example: Option<String>,
    /// When the entry was added.
    pub added_at: DateTime<Utc>,
}

impl VocabEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(term: String, meaning: String, example: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            term,
            meaning,
            example,
            added_at: Utc::now(),
        }
    }
}

/// Outcome of an insert-if-absent operation.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// The entry was stored.
    Added(VocabEntry),
    /// An entry with the same normalized term already exists.
    Duplicate,
}

/// Outcome of a delete operation. Deletion is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Progress statistics over the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabStats {
    /// Total stored entries.
    pub total: usize,
    /// Configured vocabulary goal.
    pub target_goal: u32,
    /// Fraction of the goal reached, clamped to [0, 1].
    pub progress: f32,
}

impl VocabStats {
    /// Compute stats for a store of `total` entries against a goal.
    pub fn new(total: usize, target_goal: u32) -> Self {
        let progress = if target_goal == 0 {
            1.0
        } else {
            (total as f32 / target_goal as f32).min(1.0)
        };
        Self {
            total,
            target_goal,
            progress,
        }
    }
}

/// Normalize a term for uniqueness comparison: trim plus lowercase.
///
/// Deliberately conservative — no kana/kanji script folding, so 犬 and
/// いぬ remain distinct entries.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Clamp a requested listing limit to the allowed maximum.
pub fn clamp_limit(limit: usize) -> usize {
    limit.min(MAX_LIST_LIMIT)
}

/// Trait for vocabulary store implementations.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Insert a new entry unless the normalized term already exists.
    ///
    /// The existence check and insert are atomic with respect to
    /// concurrent callers. Returns an error for empty term or meaning.
    async fn add(
        &self,
        term: &str,
        meaning: &str,
        example: Option<&str>,
    ) -> Result<AddOutcome>;

    /// List entries sorted by `added_at` descending. `limit` is clamped
    /// to [`MAX_LIST_LIMIT`].
    async fn list_recent(&self, limit: usize) -> Result<Vec<VocabEntry>>;

    /// Delete the entry with the given term (normalized comparison).
    async fn delete(&self, term: &str) -> Result<DeleteOutcome>;

    /// Sample up to `count` entries uniformly without replacement.
    /// A store smaller than `count` returns everything it has.
    async fn random_sample(&self, count: usize) -> Result<Vec<VocabEntry>>;

    /// Total number of stored entries.
    async fn count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Neko "), "neko");
        assert_eq!(normalize_term("綺麗"), "綺麗");
        assert_eq!(normalize_term("ÅRE"), "åre");
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(15), 15);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(5000), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_stats_progress() {
        let stats = VocabStats::new(25, 100);
        assert!((stats.progress - 0.25).abs() < f32::EPSILON);

        let capped = VocabStats::new(250, 100);
        assert!((capped.progress - 1.0).abs() < f32::EPSILON);

        let zero_goal = VocabStats::new(3, 0);
        assert!((zero_goal.progress - 1.0).abs() < f32::EPSILON);
    }
}
