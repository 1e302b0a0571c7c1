//! Bilingual dictionary corpus and retrieval index.
//!
//! The corpus is a static JSONL file (one entry per line) loaded once at
//! startup. Entries are immutable for the lifetime of the process; no
//! write path exists.

mod index;

pub use index::DictionaryIndex;

use crate::error::{KotobaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single dictionary entry from the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// The Japanese term (kanji or kana).
    pub term: String,
    /// Kana reading, when the term uses kanji.
    pub reading: Option<String>,
    /// Meaning in the learner's language.
    pub meaning: String,
    /// Optional example sentence.
    pub example: Option<String>,
}

impl DictionaryEntry {
    /// Text used to embed this entry for retrieval.
    ///
    /// All textual fields are concatenated so queries can match on the
    /// term, the reading, or the meaning.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.term.clone()];
        if let Some(reading) = &self.reading {
            parts.push(reading.clone());
        }
        parts.push(self.meaning.clone());
        if let Some(example) = &self.example {
            parts.push(example.clone());
        }
        parts.join(" ")
    }
}

/// A ranked lookup result.
#[derive(Debug, Clone)]
pub struct DictionaryMatch {
    /// The matched entry.
    pub entry: DictionaryEntry,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Load a dictionary corpus from a JSONL file.
///
/// Blank lines are skipped; a malformed line is an error naming the
/// offending line number.
pub fn load_corpus(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        KotobaError::Dictionary(format!("Failed to read corpus {}: {}", path.display(), e))
    })?;

    let mut entries = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: DictionaryEntry = serde_json::from_str(line).map_err(|e| {
            KotobaError::Dictionary(format!(
                "Malformed corpus entry at {}:{}: {}",
                path.display(),
                line_no + 1,
                e
            ))
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_text_includes_all_fields() {
        let entry = DictionaryEntry {
            term: "頑張って".to_string(),
            reading: Some("がんばって".to_string()),
            meaning: "semangat".to_string(),
            example: Some("頑張ってください。".to_string()),
        };

        let text = entry.embedding_text();
        assert!(text.contains("頑張って"));
        assert!(text.contains("がんばって"));
        assert!(text.contains("semangat"));
    }

    #[test]
    fn test_load_corpus_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"term":"猫","reading":"ねこ","meaning":"kucing"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"term":"犬","reading":"いぬ","meaning":"anjing","example":"犬が好き。"}}"#).unwrap();

        let entries = load_corpus(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].term, "猫");
        assert_eq!(entries[1].example.as_deref(), Some("犬が好き。"));
    }

    #[test]
    fn test_load_corpus_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_corpus(file.path()).unwrap_err();
        assert!(err.to_string().contains(":1"));
    }
}
