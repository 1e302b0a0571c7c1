//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// A minimal starter corpus so lookups work right after setup.
const STARTER_CORPUS: &str = r#"{"term": "こんにちは", "reading": "こんにちは", "meaning": "halo; selamat siang", "example": "こんにちは、元気ですか?"}
{"term": "ありがとう", "reading": "ありがとう", "meaning": "terima kasih", "example": "手伝ってくれてありがとう。"}
{"term": "頑張って", "reading": "がんばって", "meaning": "semangat; berjuanglah", "example": "試験、頑張ってください!"}
{"term": "犬", "reading": "いぬ", "meaning": "anjing", "example": "犬が公園で走っています。"}
{"term": "猫", "reading": "ねこ", "meaning": "kucing", "example": "猫はソファで寝ています。"}
{"term": "朝ご飯", "reading": "あさごはん", "meaning": "sarapan", "example": "朝ご飯にパンを食べました。"}
{"term": "綺麗", "reading": "きれい", "meaning": "cantik; indah; bersih", "example": "この花はとても綺麗ですね。"}
{"term": "勉強", "reading": "べんきょう", "meaning": "belajar", "example": "毎日日本語を勉強しています。"}
"#;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kotoba Setup");
    println!();
    println!("Welcome to Kotoba! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Kotoba requires an OpenAI API key for tutoring and dictionary lookups.");
        println!(
            "  Get your API key from: {}",
            style("https://platform.openai.com/api-keys").underlined()
        );
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'kotoba init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Create data directory
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Dictionary corpus
    println!("{}", style("Step 3: Dictionary corpus").bold().cyan());
    println!();

    let corpus_path = settings.corpus_path();
    if corpus_path.exists() {
        Output::info(&format!("Dictionary corpus exists: {}", corpus_path.display()));
    } else if prompt_continue("Create a small starter dictionary corpus?")? {
        if let Some(parent) = corpus_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&corpus_path, STARTER_CORPUS)?;
        Output::success(&format!("Created starter corpus: {}", corpus_path.display()));
        println!();
        println!("  Add your own entries as JSON lines with \"term\" and \"meaning\" fields.");
    } else {
        Output::info("Skipped corpus creation. Dictionary lookups need a corpus file.");
    }

    println!();

    // Step 4: Create config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("kotoba config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("kotoba doctor").cyan());
    println!("  {} Start a tutoring session", style("kotoba chat").cyan());
    println!(
        "  {} Save your first word",
        style("kotoba add 犬 anjing").cyan()
    );
    println!();
    println!("For more help: {}", style("kotoba --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_corpus_is_valid_jsonl() {
        for line in STARTER_CORPUS.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("term").is_some());
            assert!(value.get("meaning").is_some());
        }
    }
}
