//! Configuration module for Kotoba.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, TutorPrompts};
pub use settings::{
    DictionarySettings, EmbeddingSettings, GeneralSettings, PromptSettings, Settings,
    StoreSettings, TutorSettings,
};
