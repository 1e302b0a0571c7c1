//! Interactive tutoring chat command.

use crate::app::App;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kotoba doctor' for detailed diagnostics.");
        return Err(e);
    }

    let app = App::new(settings)?;

    // Index the corpus before the first prompt so the session never
    // pays that cost mid-conversation.
    let spinner = Output::spinner("Preparing dictionary index...");
    let index = app.index().await?;
    spinner.finish_and_clear();
    Output::info(&format!("Dictionary ready ({} entries)", index.len()));

    let mut session = app.new_session(model.as_deref()).await?;

    println!("\n{}", style("Kotoba Tutor").bold().cyan());
    println!(
        "{}\n",
        style("Ask about Japanese words, or 'exit' to quit. Use 'clear' to reset conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("またね! Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match session.handle_turn(input).await {
            Ok(response) => {
                println!("\n{} {}\n", style("Kotoba:").cyan().bold(), response);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
