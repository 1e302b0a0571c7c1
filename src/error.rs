//! Error types for Kotoba.

use thiserror::Error;

/// Library-level error type for Kotoba operations.
#[derive(Error, Debug)]
pub enum KotobaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vocabulary store error: {0}")]
    VocabularyStore(String),

    #[error("Dictionary error: {0}")]
    Dictionary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Completion endpoint timed out: {0}")]
    EndpointTimeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tutor error: {0}")]
    Tutor(String),
}

/// Result type alias for Kotoba operations.
pub type Result<T> = std::result::Result<T, KotobaError>;
