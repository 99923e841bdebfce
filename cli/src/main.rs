use anyhow::Context;
use clap::Parser;
use colored::*;
use musemate_core::MuseConfig;
use tracing::error;

// Modules used by the CLI
mod app;
mod cli;
mod logging;
mod output;

use crate::cli::Args;
use crate::output::print_usage_instructions;

/// Main function - one spark, an interactive session, or usage
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    logging::init(args.verbose);

    // Load config from file or use defaults
    let mut config = match &args.config {
        Some(path) => MuseConfig::load_from_file(path),
        None => MuseConfig::load_default(),
    }
    .context("Configuration error")?;

    if let Some(model) = args.model.clone() {
        config.model_name = Some(model);
    }
    let api_key = args.api_key.clone().or_else(|| config.resolve_api_key());

    // Call app logic based on arguments
    if args.interactive {
        if let Err(e) =
            app::run_interactive(args.intent, args.tone, api_key.as_deref(), &config, args.verbose)
                .await
        {
            error!("Error in interactive session: {:#}", e);
            eprintln!("{}", format!("Interactive session failed: {:#}", e).red());
            return Err(e);
        }
    } else if let Some(mood) = args.mood.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        app::run_single_spark(
            mood,
            args.intent,
            args.tone,
            api_key.as_deref(),
            &config,
            args.png.as_deref(),
            args.verbose,
        )
        .await?;
    } else {
        // No mood and not interactive, show usage
        print_usage_instructions();
    }

    Ok(())
}
