//! Delete command - remove a word from the vocabulary.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::vocabulary::{DeleteOutcome, VocabularyStore};

/// Run the delete command.
pub async fn run_delete(term: String, settings: Settings) -> Result<()> {
    let app = App::new(settings)?;

    match app.store().delete(&term).await? {
        DeleteOutcome::Deleted => {
            Output::success(&format!("Removed '{}' from your vocabulary.", term));
        }
        DeleteOutcome::NotFound => {
            Output::warning(&format!("'{}' is not in your vocabulary.", term));
        }
    }

    Ok(())
}
