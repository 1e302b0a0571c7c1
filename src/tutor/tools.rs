//! Tool definitions and implementations for the tutoring agent.
//!
//! The model picks from a closed set of named operations; each is
//! decoded into a `ToolCall` variant and dispatched against the
//! vocabulary store or the dictionary index. Domain outcomes the model
//! should relay (duplicate, not found, empty store) are normal results,
//! not errors.

use crate::dictionary::DictionaryIndex;
use crate::embedding::Embedder;
use crate::error::{KotobaError, Result};
use crate::vocabulary::{AddOutcome, DeleteOutcome, VocabStats, VocabularyStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Available tools for the tutor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Save a new word to the learner's vocabulary.
    AddVocabulary {
        term: String,
        meaning: String,
        example: Option<String>,
    },

    /// List the most recently added words.
    ListVocabulary {
        #[serde(default = "default_list_limit")]
        limit: usize,
    },

    /// Remove a word from the vocabulary.
    DeleteVocabulary { term: String },

    /// Draw random words for review.
    RandomVocabulary {
        #[serde(default = "default_random_count")]
        count: usize,
    },

    /// Search the bilingual dictionary.
    LookupDictionary { query: String },

    /// Report progress toward the vocabulary goal.
    VocabularyStats,
}

fn default_list_limit() -> usize {
    15
}

fn default_random_count() -> usize {
    5
}

/// Tool execution context bound to the store and the dictionary index.
pub struct ToolContext {
    pub store: Arc<dyn VocabularyStore>,
    pub index: Arc<DictionaryIndex>,
    pub embedder: Arc<dyn Embedder>,
    /// Vocabulary goal used by the stats tool.
    pub target_goal: u32,
    /// How many ranked matches a dictionary lookup returns.
    pub lookup_limit: usize,
    /// Minimum similarity below which a lookup reports not-found.
    pub min_score: f32,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(
        store: Arc<dyn VocabularyStore>,
        index: Arc<DictionaryIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            target_goal: 100,
            lookup_limit: 3,
            min_score: 0.3,
        }
    }

    /// Set the vocabulary goal.
    pub fn with_target_goal(mut self, goal: u32) -> Self {
        self.target_goal = goal;
        self
    }

    /// Set lookup ranking parameters.
    pub fn with_lookup(mut self, limit: usize, min_score: f32) -> Self {
        self.lookup_limit = limit;
        self.min_score = min_score;
        self
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::AddVocabulary {
                term,
                meaning,
                example,
            } => self.execute_add(term, meaning, example.as_deref()).await,
            ToolCall::ListVocabulary { limit } => self.execute_list(*limit).await,
            ToolCall::DeleteVocabulary { term } => self.execute_delete(term).await,
            ToolCall::RandomVocabulary { count } => self.execute_random(*count).await,
            ToolCall::LookupDictionary { query } => self.execute_lookup(query).await,
            ToolCall::VocabularyStats => self.execute_stats().await,
        }
    }

    async fn execute_add(
        &self,
        term: &str,
        meaning: &str,
        example: Option<&str>,
    ) -> Result<String> {
        match self.store.add(term, meaning, example).await? {
            AddOutcome::Added(entry) => Ok(format!(
                "Added '{}' ({}) to the vocabulary.",
                entry.term, entry.meaning
            )),
            AddOutcome::Duplicate => Ok(format!(
                "'{}' is already in the vocabulary; nothing was added.",
                term.trim()
            )),
        }
    }

    async fn execute_list(&self, limit: usize) -> Result<String> {
        let entries = self.store.list_recent(limit).await?;

        if entries.is_empty() {
            return Ok("The vocabulary is empty.".to_string());
        }

        let formatted = entries
            .iter()
            .map(|e| {
                let mut line = format!("- {} ({})", e.term, e.meaning);
                if let Some(example) = &e.example {
                    line.push_str(&format!(" / {}", example));
                }
                line.push_str(&format!(" [added {}]", e.added_at.format("%Y-%m-%d")));
                line
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            "Most recent vocabulary ({} entries):\n{}",
            entries.len(),
            formatted
        ))
    }

    async fn execute_delete(&self, term: &str) -> Result<String> {
        match self.store.delete(term).await? {
            DeleteOutcome::Deleted => {
                Ok(format!("Removed '{}' from the vocabulary.", term.trim()))
            }
            DeleteOutcome::NotFound => Ok(format!(
                "'{}' is not in the vocabulary; nothing to remove.",
                term.trim()
            )),
        }
    }

    async fn execute_random(&self, count: usize) -> Result<String> {
        let entries = self.store.random_sample(count).await?;

        if entries.is_empty() {
            return Ok("The vocabulary is empty; nothing to review yet.".to_string());
        }

        let formatted = entries
            .iter()
            .map(|e| format!("- {} ({})", e.term, e.meaning))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            "Random words for review ({}):\n{}",
            entries.len(),
            formatted
        ))
    }

    async fn execute_lookup(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(KotobaError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        let query_embedding = self.embedder.embed(query).await?;
        let matches = self
            .index
            .search(&query_embedding, self.lookup_limit, self.min_score);

        if matches.is_empty() {
            return Ok(format!("No dictionary entry matched '{}'.", query));
        }

        let formatted = matches
            .iter()
            .map(|m| {
                let mut line = match &m.entry.reading {
                    Some(reading) => format!("- {}【{}】: {}", m.entry.term, reading, m.entry.meaning),
                    None => format!("- {}: {}", m.entry.term, m.entry.meaning),
                };
                if let Some(example) = &m.entry.example {
                    line.push_str(&format!("\n  Example: {}", example));
                }
                line.push_str(&format!(" (similarity {:.2})", m.score));
                line
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            "Found {} dictionary match(es) for '{}':\n{}",
            matches.len(),
            query,
            formatted
        ))
    }

    async fn execute_stats(&self) -> Result<String> {
        let total = self.store.count().await?;
        let stats = VocabStats::new(total, self.target_goal);

        Ok(format!(
            "Vocabulary progress: {} of {} words saved ({:.0}%).",
            stats.total,
            stats.target_goal,
            stats.progress * 100.0
        ))
    }
}

/// Get OpenAI function/tool definitions for the tutor.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "add_vocabulary".to_string(),
                description: Some(
                    "Save a new word with its meaning to the learner's personal vocabulary. \
                    Use this when the learner asks to remember or add a word."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "term": {
                            "type": "string",
                            "description": "The Japanese word (kanji or kana)"
                        },
                        "meaning": {
                            "type": "string",
                            "description": "Meaning in the learner's language"
                        },
                        "example": {
                            "type": "string",
                            "description": "Optional example sentence in Japanese"
                        }
                    },
                    "required": ["term", "meaning"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "list_vocabulary".to_string(),
                description: Some(
                    "List the learner's most recently added vocabulary. \
                    Use this when the learner wants to see saved words."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of entries (default: 15)",
                            "default": 15
                        }
                    }
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "delete_vocabulary".to_string(),
                description: Some(
                    "Remove a word from the learner's vocabulary by its term.".to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "term": {
                            "type": "string",
                            "description": "The word to remove"
                        }
                    },
                    "required": ["term"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "random_vocabulary".to_string(),
                description: Some(
                    "Draw random saved words for review practice. \
                    Use this when the learner asks to review or be quizzed informally."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "count": {
                            "type": "integer",
                            "description": "How many words to draw (default: 5)",
                            "default": 5
                        }
                    }
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "lookup_dictionary".to_string(),
                description: Some(
                    "Search the bilingual Japanese dictionary for a word, reading, or \
                    meaning. Use this for questions like 'what is X in Japanese?' or \
                    'what does Y mean?'."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Free-text search query"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "vocabulary_stats".to_string(),
                description: Some(
                    "Report how many words the learner has saved and progress toward \
                    the vocabulary goal."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| KotobaError::Tutor(format!("Invalid tool arguments: {}", e)))?;

    let required_str = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| KotobaError::Tutor(format!("Missing '{}' argument", key)))
    };

    match name {
        "add_vocabulary" => Ok(ToolCall::AddVocabulary {
            term: required_str("term")?,
            meaning: required_str("meaning")?,
            example: args["example"].as_str().map(|s| s.to_string()),
        }),
        "list_vocabulary" => Ok(ToolCall::ListVocabulary {
            limit: args["limit"].as_u64().unwrap_or(15) as usize,
        }),
        "delete_vocabulary" => Ok(ToolCall::DeleteVocabulary {
            term: required_str("term")?,
        }),
        "random_vocabulary" => Ok(ToolCall::RandomVocabulary {
            count: args["count"].as_u64().unwrap_or(5) as usize,
        }),
        "lookup_dictionary" => Ok(ToolCall::LookupDictionary {
            query: required_str("query")?,
        }),
        "vocabulary_stats" => Ok(ToolCall::VocabularyStats),
        _ => Err(KotobaError::Tutor(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;
    use crate::embedding::test_support::StaticEmbedder;
    use crate::vocabulary::MemoryVocabularyStore;
    use std::collections::HashMap;

    async fn test_context() -> ToolContext {
        let entries = vec![DictionaryEntry {
            term: "頑張って".to_string(),
            reading: Some("がんばって".to_string()),
            meaning: "semangat".to_string(),
            example: None,
        }];

        let mut vectors = HashMap::new();
        vectors.insert(entries[0].embedding_text(), vec![1.0, 0.0]);
        vectors.insert("頑張って".to_string(), vec![1.0, 0.0]);
        let embedder = std::sync::Arc::new(StaticEmbedder::new(vectors, vec![0.0, 1.0]));

        let index = crate::dictionary::DictionaryIndex::build(entries, embedder.clone())
            .await
            .unwrap();

        ToolContext::new(
            std::sync::Arc::new(MemoryVocabularyStore::new()),
            std::sync::Arc::new(index),
            embedder,
        )
    }

    #[test]
    fn test_parse_add_tool() {
        let tool = parse_tool_call(
            "add_vocabulary",
            r#"{"term": "猫", "meaning": "kucing", "example": "猫が好き。"}"#,
        )
        .unwrap();
        match tool {
            ToolCall::AddVocabulary {
                term,
                meaning,
                example,
            } => {
                assert_eq!(term, "猫");
                assert_eq!(meaning, "kucing");
                assert_eq!(example.as_deref(), Some("猫が好き。"));
            }
            _ => panic!("Expected AddVocabulary tool"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let tool = parse_tool_call("list_vocabulary", "{}").unwrap();
        assert!(matches!(tool, ToolCall::ListVocabulary { limit: 15 }));

        let tool = parse_tool_call("random_vocabulary", "{}").unwrap();
        assert!(matches!(tool, ToolCall::RandomVocabulary { count: 5 }));
    }

    #[test]
    fn test_parse_unknown_tool() {
        assert!(parse_tool_call("transcribe", "{}").is_err());
        assert!(parse_tool_call("add_vocabulary", r#"{"term": "猫"}"#).is_err());
    }

    #[tokio::test]
    async fn test_add_then_duplicate_then_stats() {
        let ctx = test_context().await;

        let first = ctx
            .execute(&ToolCall::AddVocabulary {
                term: "綺麗".to_string(),
                meaning: "cantik".to_string(),
                example: None,
            })
            .await
            .unwrap();
        assert!(first.contains("Added"));

        let second = ctx
            .execute(&ToolCall::AddVocabulary {
                term: "綺麗".to_string(),
                meaning: "cantik".to_string(),
                example: None,
            })
            .await
            .unwrap();
        assert!(second.contains("already"));

        let stats = ctx.execute(&ToolCall::VocabularyStats).await.unwrap();
        assert!(stats.contains("1 of 100"));
    }

    #[tokio::test]
    async fn test_lookup_found_and_not_found() {
        let ctx = test_context().await;

        let found = ctx
            .execute(&ToolCall::LookupDictionary {
                query: "頑張って".to_string(),
            })
            .await
            .unwrap();
        assert!(found.contains("semangat"));

        let missing = ctx
            .execute(&ToolCall::LookupDictionary {
                query: "zzzznotaword".to_string(),
            })
            .await
            .unwrap();
        assert!(missing.contains("No dictionary entry matched"));
    }

    #[tokio::test]
    async fn test_delete_reports_not_found() {
        let ctx = test_context().await;

        let result = ctx
            .execute(&ToolCall::DeleteVocabulary {
                term: "inu".to_string(),
            })
            .await
            .unwrap();
        assert!(result.contains("not in the vocabulary"));
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let ctx = test_context().await;

        let result = ctx
            .execute(&ToolCall::ListVocabulary { limit: 15 })
            .await
            .unwrap();
        assert!(result.contains("empty"));
    }
}
