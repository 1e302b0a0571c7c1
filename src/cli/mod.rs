//! CLI module for Kotoba.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kotoba - Japanese Vocabulary Tutor
///
/// A CLI tutor for learning Japanese vocabulary, with a personal word
/// store and a bilingual dictionary. "Kotoba" is Japanese for "word."
#[derive(Parser, Debug)]
#[command(name = "kotoba")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Kotoba and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Start an interactive tutoring session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Add a word to your vocabulary
    Add {
        /// The word to save (Japanese)
        term: String,

        /// Its meaning (Indonesian)
        meaning: String,

        /// Example sentence using the word
        #[arg(short, long)]
        example: Option<String>,
    },

    /// List recently saved vocabulary
    List {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "15")]
        limit: usize,
    },

    /// Delete a word from your vocabulary
    Delete {
        /// The word to remove
        term: String,
    },

    /// Show a random sample of saved words for review
    Random {
        /// Number of words to sample
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Show vocabulary progress toward the learning goal
    Stats,

    /// Search the bilingual dictionary
    Lookup {
        /// What to look up (Japanese or Indonesian)
        query: String,

        /// Maximum number of matches
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long)]
        min_score: Option<f32>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "tutor.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
