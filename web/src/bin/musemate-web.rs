use anyhow::Context;
use chrono::Duration;
use clap::Parser;
use musemate_card::ShareCard;
use musemate_core::{OpenAiClient, SharedBackend, SparkAcquirer};
use musemate_web::config::{ServerConfig, DEFAULT_HTTP_ADDR};
use musemate_web::http_server::{self, AppState};
use musemate_web::session::{InMemorySessionStore, SessionStore, SessionStoreRef};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "musemate-web", about = "MuseMate Lite web UI")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OpenAI API key (overrides config file and OPENAI_API_KEY)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Model to use
    #[arg(short = 'o', long)]
    model: Option<String>,

    /// HTTP server address
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    /// Font used for share cards
    #[arg(long)]
    font: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting MuseMate web daemon");

    // Parse command line args
    let args = Args::parse();

    // Load config from file or use defaults
    let mut config = ServerConfig::load(args.config.as_deref(), args.http_addr)
        .context("Configuration error")?;

    // Update config from CLI args
    if let Some(model) = args.model {
        config.muse.model_name = Some(model);
    }
    if let Some(font) = args.font {
        config.muse.font_path = Some(font);
    }
    let api_key = args.api_key.or_else(|| config.muse.resolve_api_key());

    // Initialize the API client; without a key every request gets the fallback
    let backend: Option<SharedBackend> = match api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let client = OpenAiClient::new(key, &config.muse)
                .context("Failed to initialize OpenAI client")?;
            info!("Initialized OpenAI client for model {}", config.muse.model());
            let backend: SharedBackend = Arc::new(client);
            Some(backend)
        }
        _ => {
            warn!("No API key loaded; sparks will use the offline fallback");
            None
        }
    };

    let card = ShareCard::load(config.muse.font_path.as_deref())
        .context("Failed to load card font")?;
    info!("Share cards use font {:?}", card.font().path());

    let store = Arc::new(InMemorySessionStore::new());
    let sessions: SessionStoreRef = store.clone();
    let state = AppState::new(
        SparkAcquirer::new(backend, config.muse.backoff()),
        sessions,
        card,
        config.muse.model(),
        Duration::minutes(config.session_idle_minutes),
    );

    // Sweep idle sessions
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            if let Err(e) = store.cleanup_expired_sessions().await {
                error!(error = %e, "Session cleanup failed");
            }
        }
    });

    http_server::run_server(&config, state).await?;

    info!("MuseMate web daemon shutting down");
    Ok(())
}
