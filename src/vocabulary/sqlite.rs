//! SQLite-backed vocabulary store.
//!
//! Uniqueness is enforced by a unique index on the normalized term, so
//! the check-then-insert of `add` is a single atomic statement even
//! under concurrent sessions. A separate append-only `learning_log`
//! table records every successful add for audit.

use super::{
    clamp_limit, normalize_term, AddOutcome, DeleteOutcome, VocabEntry, VocabularyStore,
};
use crate::error::{KotobaError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vocabulary (
    id TEXT PRIMARY KEY,
    term TEXT NOT NULL,
    term_normalized TEXT NOT NULL,
    meaning TEXT NOT NULL,
    example TEXT,
    added_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_vocabulary_term
    ON vocabulary(term_normalized);
CREATE INDEX IF NOT EXISTS idx_vocabulary_added_at
    ON vocabulary(added_at);

CREATE TABLE IF NOT EXISTS learning_log (
    term TEXT NOT NULL,
    meaning TEXT NOT NULL,
    inserted_at TEXT NOT NULL
);
"#;

/// SQLite-backed vocabulary store.
pub struct SqliteVocabularyStore {
    conn: Mutex<Connection>,
}

impl SqliteVocabularyStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets readers proceed while a writer commits
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized vocabulary store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of audit rows in the learning log.
    pub fn log_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM learning_log", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| KotobaError::VocabularyStore(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<VocabEntry> {
        let id_str: String = row.get(0)?;
        let added_at_str: String = row.get(4)?;

        Ok(VocabEntry {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            term: row.get(1)?,
            meaning: row.get(2)?,
            example: row.get(3)?,
            added_at: DateTime::parse_from_rfc3339(&added_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VocabularyStore for SqliteVocabularyStore {
    #[instrument(skip(self, meaning, example))]
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

        let entry = VocabEntry::new(
            term.to_string(),
            meaning.to_string(),
            example.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
        );

        let conn = self.lock()?;

        // Unique index on term_normalized makes this atomic; a duplicate
        // term leaves the table untouched and reports zero changed rows.
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO vocabulary
            (id, term, term_normalized, meaning, example, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.id.to_string(),
                entry.term,
                normalize_term(&entry.term),
                entry.meaning,
                entry.example,
                entry.added_at.to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            debug!("Duplicate term '{}', not added", entry.term);
            return Ok(AddOutcome::Duplicate);
        }

        conn.execute(
            "INSERT INTO learning_log (term, meaning, inserted_at) VALUES (?1, ?2, ?3)",
            params![entry.term, entry.meaning, entry.added_at.to_rfc3339()],
        )?;

        info!("Added vocabulary entry '{}'", entry.term);
        Ok(AddOutcome::Added(entry))
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> Result<Vec<VocabEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, term, meaning, example, added_at
            FROM vocabulary
            ORDER BY added_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let entries = stmt.query_map(params![clamp_limit(limit) as i64], Self::row_to_entry)?;
        let result: Vec<VocabEntry> = entries.filter_map(|e| e.ok()).collect();

        debug!("Listed {} vocabulary entries", result.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn delete(&self, term: &str) -> Result<DeleteOutcome> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM vocabulary WHERE term_normalized = ?1",
            params![normalize_term(term)],
        )?;

        if deleted > 0 {
            info!("Deleted vocabulary entry '{}'", term.trim());
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    #[instrument(skip(self))]
    async fn random_sample(&self, count: usize) -> Result<Vec<VocabEntry>> {
        let conn = self.lock()?;

        // ORDER BY RANDOM() is a uniform draw without replacement
        let mut stmt = conn.prepare(
            r#"
            SELECT id, term, meaning, example, added_at
            FROM vocabulary
            ORDER BY RANDOM()
            LIMIT ?1
            "#,
        )?;

        let entries = stmt.query_map(params![clamp_limit(count) as i64], Self::row_to_entry)?;
        Ok(entries.filter_map(|e| e.ok()).collect())
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM vocabulary", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_duplicate() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        let first = store.add("綺麗", "cantik", None).await.unwrap();
        assert!(matches!(first, AddOutcome::Added(_)));

        let second = store.add("綺麗", "cantik", None).await.unwrap();
        assert!(matches!(second, AddOutcome::Duplicate));

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.log_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_detection_is_normalized() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        store.add("Neko", "kucing", None).await.unwrap();
        let outcome = store.add("  neko ", "kucing", None).await.unwrap();
        assert!(matches!(outcome, AddOutcome::Duplicate));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_fields() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        assert!(store.add("  ", "kucing", None).await.is_err());
        assert!(store.add("neko", "", None).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_round_trip() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        store.add("inu", "anjing", Some("犬がいます。")).await.unwrap();
        let listed = store.list_recent(15).await.unwrap();
        assert_eq!(listed.len(), 1);

        let deleted = store.delete(&listed[0].term).await.unwrap();
        assert_eq!(deleted, DeleteOutcome::Deleted);
        assert!(store.list_recent(15).await.unwrap().is_empty());

        // Idempotent: deleting again reports not-found, no error
        let again = store.delete("inu").await.unwrap();
        assert_eq!(again, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_list_recent_ordering() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        for (term, meaning) in [("ichi", "satu"), ("ni", "dua"), ("san", "tiga")] {
            store.add(term, meaning, None).await.unwrap();
        }

        let listed = store.list_recent(10).await.unwrap();
        assert_eq!(listed.len(), 3);
        for pair in listed.windows(2) {
            assert!(pair[0].added_at >= pair[1].added_at);
        }
    }

    #[tokio::test]
    async fn test_random_sample_smaller_store() {
        let store = SqliteVocabularyStore::in_memory().unwrap();

        store.add("neko", "kucing", None).await.unwrap();
        store.add("inu", "anjing", None).await.unwrap();
        store.add("tori", "burung", None).await.unwrap();

        let sample = store.random_sample(5).await.unwrap();
        assert_eq!(sample.len(), 3);

        let mut terms: Vec<_> = sample.iter().map(|e| e.term.as_str()).collect();
        terms.sort_unstable();
        assert_eq!(terms, vec!["inu", "neko", "tori"]);
    }

    #[tokio::test]
    async fn test_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.db");

        {
            let store = SqliteVocabularyStore::new(&path).unwrap();
            store.add("neko", "kucing", None).await.unwrap();
        }

        let reopened = SqliteVocabularyStore::new(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
