//! Kotoba CLI entry point.

use anyhow::Result;
use clap::Parser;
use kotoba::cli::{commands, Cli, Commands};
use kotoba::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kotoba={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), settings).await?;
        }

        Commands::Add {
            term,
            meaning,
            example,
        } => {
            commands::run_add(term.clone(), meaning.clone(), example.clone(), settings).await?;
        }

        Commands::List { limit } => {
            commands::run_list(*limit, settings).await?;
        }

        Commands::Delete { term } => {
            commands::run_delete(term.clone(), settings).await?;
        }

        Commands::Random { count } => {
            commands::run_random(*count, settings).await?;
        }

        Commands::Stats => {
            commands::run_stats(settings).await?;
        }

        Commands::Lookup {
            query,
            limit,
            min_score,
        } => {
            commands::run_lookup(query.clone(), *limit, *min_score, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
