//! Kotoba - Japanese Vocabulary Tutor
//!
//! A CLI tutor for learning Japanese vocabulary. Kotoba pairs a
//! tool-calling LLM tutor with a personal vocabulary store and a
//! bilingual (Japanese-Indonesian) dictionary index.
//!
//! "Kotoba" (言葉) is Japanese for "word."
//!
//! # Overview
//!
//! Kotoba allows you to:
//! - Chat with a bilingual tutor that saves and quizzes vocabulary
//! - Manage your personal word list directly from the command line
//! - Look up words in a semantically indexed bilingual dictionary
//! - Track progress toward a vocabulary goal
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `vocabulary` - The personal vocabulary store
//! - `dictionary` - The bilingual dictionary corpus and retrieval index
//! - `embedding` - Embedding generation
//! - `tutor` - The tool-calling tutoring session
//! - `app` - Component wiring shared by the CLI and the HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use kotoba::app::App;
//! use kotoba::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let app = App::new(settings)?;
//!
//!     let mut session = app.new_session(None).await?;
//!     let answer = session.handle_turn("Apa arti 犬?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod tutor;
pub mod vocabulary;

pub use error::{KotobaError, Result};
