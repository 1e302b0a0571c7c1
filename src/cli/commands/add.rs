//! Add command - save a word to the vocabulary.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::vocabulary::{AddOutcome, VocabularyStore};

/// Run the add command.
pub async fn run_add(
    term: String,
    meaning: String,
    example: Option<String>,
    settings: Settings,
) -> Result<()> {
    let app = App::new(settings)?;

    match app.store().add(&term, &meaning, example.as_deref()).await? {
        AddOutcome::Added(entry) => {
            Output::success(&format!("Saved {} - {}", entry.term, entry.meaning));
            if let Some(example) = &entry.example {
                Output::kv("example", example);
            }
        }
        AddOutcome::Duplicate => {
            Output::warning(&format!("'{}' is already in your vocabulary.", term));
        }
    }

    Ok(())
}
