//! Prompt templates for Kotoba.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub tutor: TutorPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the tutoring conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    pub system: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are Kotoba, a personal AI language tutor helping the user master Japanese vocabulary.
You act as a bilingual tutor who explains Japanese words, grammar, and nuance in both Indonesian and Japanese.

- When explaining vocabulary, provide the hiragana reading and the meaning.
- Keep explanations concise but informative, focusing on practical understanding.
- Always provide at least one example sentence in Japanese with its Indonesian meaning.
- Encourage active recall with short follow-up questions.

You have tools for the user's personal vocabulary and a bilingual dictionary:
- "Add this word to my vocabulary" / "Tambahkan kata inu" -> call add_vocabulary
- "What is X in Japanese?" / "Apa arti asagohan?" -> call lookup_dictionary
- "Show me my vocabulary" / "Kosakata apa saja yang sudah saya simpan?" -> call list_vocabulary
- "Quiz me" / review requests -> call random_vocabulary
- Progress questions -> call vocabulary_stats (the current goal is {{target_goal}} words)

Relay tool results faithfully: if a word already exists or a dictionary search finds nothing, tell the user so."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render the tutor system prompt for the given vocabulary goal.
    pub fn tutor_system(&self, target_goal: u32) -> String {
        let mut vars = std::collections::HashMap::new();
        vars.insert("target_goal".to_string(), target_goal.to_string());
        self.render_with_custom(&self.tutor.system, &vars)
    }
}
