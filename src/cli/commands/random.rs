//! Random command - sample saved words for review.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::vocabulary::VocabularyStore;

/// Run the random command.
pub async fn run_random(count: usize, settings: Settings) -> Result<()> {
    let app = App::new(settings)?;
    let entries = app.store().random_sample(count).await?;

    if entries.is_empty() {
        Output::info("Your vocabulary is empty. Save a word with 'kotoba add <term> <meaning>'.");
        return Ok(());
    }

    Output::header(&format!("Review These Words ({})", entries.len()));
    for entry in &entries {
        Output::vocab_entry(entry);
    }

    Ok(())
}
