//! Lookup command - search the bilingual dictionary.

use crate::app::App;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::error::Result;

/// Run the lookup command.
pub async fn run_lookup(
    query: String,
    limit: Option<usize>,
    min_score: Option<f32>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Lookup, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kotoba doctor' for detailed diagnostics.");
        return Err(e);
    }

    let limit = limit.unwrap_or(settings.dictionary.lookup_limit);
    let min_score = min_score.unwrap_or(settings.dictionary.min_score);
    let app = App::new(settings)?;

    let spinner = Output::spinner("Searching dictionary...");
    let index = app.index().await?;
    let query_embedding = app.embedder().embed(&query).await?;
    let matches = index.search(&query_embedding, limit, min_score);
    spinner.finish_and_clear();

    if matches.is_empty() {
        Output::info(&format!("No dictionary entry matched '{}'.", query));
        return Ok(());
    }

    Output::header(&format!("Dictionary Matches for '{}'", query));
    for m in &matches {
        Output::dictionary_match(m);
    }
    println!();

    Ok(())
}
