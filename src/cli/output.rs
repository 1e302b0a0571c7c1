//! CLI output formatting utilities.

use crate::dictionary::DictionaryMatch;
use crate::vocabulary::VocabEntry;
use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a saved vocabulary entry.
    pub fn vocab_entry(entry: &VocabEntry) {
        let added = entry.added_at.format("%Y-%m-%d");
        match &entry.example {
            Some(example) => println!(
                "  {} {} - {} ({})\n    {}",
                style("*").cyan(),
                style(&entry.term).bold(),
                entry.meaning,
                style(added).dim(),
                style(example).italic()
            ),
            None => println!(
                "  {} {} - {} ({})",
                style("*").cyan(),
                style(&entry.term).bold(),
                entry.meaning,
                style(added).dim()
            ),
        }
    }

    /// Print a dictionary match with its similarity score.
    pub fn dictionary_match(m: &DictionaryMatch) {
        let reading = m
            .entry
            .reading
            .as_deref()
            .map(|r| format!(" [{}]", r))
            .unwrap_or_default();
        println!(
            "\n{} {}{} - {} (score: {:.2})",
            style(">>").green(),
            style(&m.entry.term).bold(),
            style(reading).cyan(),
            m.entry.meaning,
            m.score
        );
        if let Some(example) = &m.entry.example {
            println!("   {}", style(example).italic());
        }
    }

    /// Print a progress line toward the vocabulary goal.
    pub fn goal_progress(total: usize, goal: u32, progress: f32) {
        let percent = (progress * 100.0).round() as u32;
        println!(
            "  {} of {} words saved ({}%)",
            style(total).bold(),
            goal,
            percent
        );
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Style for titles.
    pub fn title_style() -> Style {
        Style::new().bold()
    }

    /// Style for dim text.
    pub fn dim_style() -> Style {
        Style::new().dim()
    }
}
