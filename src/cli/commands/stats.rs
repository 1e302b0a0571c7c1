//! Stats command - vocabulary progress toward the learning goal.

use crate::app::App;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::vocabulary::{VocabStats, VocabularyStore};

/// Run the stats command.
pub async fn run_stats(settings: Settings) -> Result<()> {
    let target_goal = settings.tutor.target_goal;
    let app = App::new(settings)?;

    let total = app.store().count().await?;
    let stats = VocabStats::new(total, target_goal);

    Output::header("Vocabulary Progress");
    Output::goal_progress(stats.total, stats.target_goal, stats.progress);

    if stats.total >= stats.target_goal as usize {
        Output::success("Goal reached! おめでとう!");
    }

    Ok(())
}
