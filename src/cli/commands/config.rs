//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted key assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "tutor.model" => settings.tutor.model = value.to_string(),
        "tutor.max_tool_rounds" => settings.tutor.max_tool_rounds = value.parse()?,
        "tutor.target_goal" => settings.tutor.target_goal = value.parse()?,
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = value.parse()?,
        "store.provider" => settings.store.provider = value.to_string(),
        "store.sqlite_path" => settings.store.sqlite_path = value.to_string(),
        "dictionary.corpus_path" => settings.dictionary.corpus_path = value.to_string(),
        "dictionary.lookup_limit" => settings.dictionary.lookup_limit = value.parse()?,
        "dictionary.min_score" => settings.dictionary.min_score = value.parse()?,
        other => anyhow::bail!("Unknown configuration key: {}", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_keys() {
        let mut settings = Settings::default();
        set_value(&mut settings, "tutor.target_goal", "200").unwrap();
        set_value(&mut settings, "tutor.model", "gpt-4o").unwrap();
        assert_eq!(settings.tutor.target_goal, 200);
        assert_eq!(settings.tutor.model, "gpt-4o");
    }

    #[test]
    fn test_set_unknown_key_fails() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "nope.nope", "1").is_err());
    }

    #[test]
    fn test_set_bad_number_fails() {
        let mut settings = Settings::default();
        assert!(set_value(&mut settings, "tutor.target_goal", "abc").is_err());
    }
}
