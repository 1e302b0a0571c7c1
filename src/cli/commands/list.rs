//! List command - show recently saved vocabulary.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::vocabulary::VocabularyStore;

/// Run the list command.
pub async fn run_list(limit: usize, settings: Settings) -> Result<()> {
    let app = App::new(settings)?;
    let entries = app.store().list_recent(limit).await?;

    if entries.is_empty() {
        Output::info("Your vocabulary is empty. Save a word with 'kotoba add <term> <meaning>'.");
        return Ok(());
    }

    Output::header(&format!("Recent Vocabulary ({})", entries.len()));
    for entry in &entries {
        Output::vocab_entry(entry);
    }

    Ok(())
}
