//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is in place before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{KotobaError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Tutoring needs the API key and the dictionary corpus.
    Chat,
    /// Dictionary lookup needs the API key and the corpus.
    Lookup,
    /// Direct vocabulary commands only touch the local store.
    Store,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat | Operation::Lookup => {
            check_api_key()?;
            check_corpus(settings)?;
        }
        Operation::Store => {
            // No external requirements for the local store
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(KotobaError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(KotobaError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the dictionary corpus file exists.
fn check_corpus(settings: &Settings) -> Result<()> {
    let path = settings.corpus_path();
    if path.exists() {
        Ok(())
    } else {
        Err(KotobaError::Config(format!(
            "Dictionary corpus not found at {}. Run 'kotoba init' or set [dictionary] corpus_path.",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_operations_have_no_requirements() {
        let settings = Settings::default();
        assert!(check(Operation::Store, &settings).is_ok());
    }
}
