use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use musemate_card::{ShareCard, PLACEHOLDER_TEXT};
use musemate_core::{
    build_conversation, generate_spark, HistoryEntry, Intent, MuseConfig, OpenAiClient,
    SparkAcquirer, SparkHistory, SparkRequest, Tone,
};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::output::{print_history, print_interactive_help, print_spark};

/// What the user asked for in one interactive line
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Help,
    Intent(&'a str),
    Tone(&'a str),
    History,
    Clear,
    Card(&'a str),
    Unknown(&'a str),
    Mood(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        return Command::Exit;
    }
    let Some(rest) = input.strip_prefix('/') else {
        return Command::Mood(input);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name.to_ascii_lowercase().as_str() {
        "help" => Command::Help,
        "intent" => Command::Intent(arg),
        "tone" => Command::Tone(arg),
        "history" => Command::History,
        "clear" => Command::Clear,
        "card" => Command::Card(arg),
        _ => Command::Unknown(input),
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message("Finding your spark...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Render `spark` (or the placeholder) and write the PNG to `path`
fn save_card(card: &ShareCard, spark: &str, path: &Path) -> Result<()> {
    let text = if spark.trim().is_empty() {
        PLACEHOLDER_TEXT
    } else {
        spark
    };
    let png = card.render(text).context("Failed to render share card")?;
    std::fs::write(path, png)
        .with_context(|| format!("Failed to write card to {}", path.display()))?;
    info!("Saved share card to {}", path.display());
    Ok(())
}

/// Runs a single spark, optionally saving the share card
pub async fn run_single_spark(
    mood: &str,
    intent: Intent,
    tone: Tone,
    api_key: Option<&str>,
    config: &MuseConfig,
    png: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    info!("Running single spark ({}, {})", intent, tone);

    let conversation = build_conversation(&SparkRequest::new(mood, intent, tone).to_payload());
    let spinner = spinner();
    let result = generate_spark(&conversation, api_key, config).await;
    spinner.finish_and_clear();

    let entry = HistoryEntry::new(intent, tone, result);
    print_spark(&entry, verbose);

    if let Some(path) = png {
        let card = ShareCard::load(config.font_path.as_deref())
            .context("Failed to load card font")?;
        save_card(&card, &entry.spark, path)?;
        println!("{} {}", "Card saved:".green(), path.display());
    }

    Ok(())
}

/// Runs an interactive session with a local history
pub async fn run_interactive(
    mut intent: Intent,
    mut tone: Tone,
    api_key: Option<&str>,
    config: &MuseConfig,
    verbose: bool,
) -> Result<()> {
    let backend = match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => Some(OpenAiClient::new(key, config).context("Failed to initialize OpenAI client")?),
        None => {
            warn!("No API key loaded; sparks will use the offline fallback");
            None
        }
    };
    let acquirer = SparkAcquirer::new(backend, config.backoff());
    let card =
        ShareCard::load(config.font_path.as_deref()).context("Failed to load card font")?;
    let mut history = SparkHistory::new();

    println!("Starting interactive MuseMate session.");
    println!("Type '/help' for commands, 'exit' or 'quit' to end the session.");
    println!();

    loop {
        print!("{} ", format!("[{} • {}]", intent, tone).green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            // EOF
            break;
        }

        match parse_command(&input) {
            Command::Exit => {
                println!("See you tomorrow.");
                break;
            }
            Command::Mood("") => continue,
            Command::Help => print_interactive_help(),
            Command::Intent(raw) => match raw.parse::<Intent>() {
                Ok(choice) => intent = choice,
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            Command::Tone(raw) => match raw.parse::<Tone>() {
                Ok(choice) => tone = choice,
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            Command::History => print_history(&history),
            Command::Clear => {
                history.clear();
                println!("History cleared.");
            }
            Command::Card("") => eprintln!("{}", "Usage: /card <PATH>".red()),
            Command::Card(path) => {
                let spark = history.latest().map(|e| e.spark.as_str()).unwrap_or_default();
                match save_card(&card, spark, Path::new(path)) {
                    Ok(()) => println!("{} {}", "Card saved:".green(), path),
                    Err(e) => eprintln!("{}", format!("{:#}", e).red()),
                }
            }
            Command::Unknown(raw) => {
                eprintln!("{}", format!("Unknown command: {}", raw).red());
            }
            Command::Mood(mood) => {
                debug!("Sparking for mood: {}", mood);
                let conversation =
                    build_conversation(&SparkRequest::new(mood, intent, tone).to_payload());
                let spinner = spinner();
                let result = acquirer.acquire(&conversation).await;
                spinner.finish_and_clear();

                let entry = HistoryEntry::new(intent, tone, result);
                print_spark(&entry, verbose);
                history.record(entry);
            }
        }

        println!(); // Add spacing between interactions
    }

    Ok(())
}
