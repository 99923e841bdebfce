use crate::config::ServerConfig;
use crate::session::{SessionStoreError, SessionStoreRef};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use musemate_card::{ShareCard, PLACEHOLDER_TEXT};
use musemate_core::{
    build_conversation, HistoryEntry, Intent, SharedBackend, SparkAcquirer, SparkHistory,
    SparkRequest, Tone,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../static/index.html");
const EMPTY_MOOD: &str = "Add a short mood or intent first.";

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    acquirer: Arc<SparkAcquirer<SharedBackend>>,
    sessions: SessionStoreRef,
    card: Arc<ShareCard>,
    model: Arc<str>,
    session_idle: Duration,
}

impl AppState {
    pub fn new(
        acquirer: SparkAcquirer<SharedBackend>,
        sessions: SessionStoreRef,
        card: ShareCard,
        model: &str,
        session_idle: Duration,
    ) -> Self {
        Self {
            acquirer: Arc::new(acquirer),
            sessions,
            card: Arc::new(card),
            model: Arc::from(model),
            session_idle,
        }
    }
}

/// The caller's session ID, or a new one when none was sent
fn session_id(id: Option<String>) -> String {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Request model for sparks
#[derive(Deserialize)]
pub struct SparkBody {
    session_id: Option<String>,
    mood: Option<String>,
    intent: Option<String>,
    tone: Option<String>,
}

/// Response model for sparks
#[derive(Serialize)]
pub struct SparkResponse {
    session_id: String,
    entry: HistoryEntry,
    history: SparkHistory,
}

#[derive(Serialize)]
pub struct StatusResponse {
    api_key_loaded: bool,
    model: String,
    intents: Vec<&'static str>,
    tones: Vec<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error type for HTTP server
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(anyhow::Error),
}

impl From<SessionStoreError> for ApiError {
    fn from(e: SessionStoreError) -> Self {
        match e {
            SessionStoreError::NotFound(id) => Self::NotFound(format!("Session not found: {}", id)),
            other => Self::InternalError(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::InternalError(e) => {
                error!(error = %e, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", e),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/spark", post(handle_spark))
        .route("/api/sessions/:id", delete(delete_session))
        .route(
            "/api/sessions/:id/history",
            get(get_history).delete(clear_history),
        )
        .route("/api/sessions/:id/card.png", get(download_card))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    info!("Starting HTTP server on {}", config.http_addr);

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.http_addr, e))?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start HTTP server: {}", e))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "MuseMate is running"
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api_key_loaded: state.acquirer.has_backend(),
        model: state.model.to_string(),
        intents: Intent::ALL.iter().map(Intent::label).collect(),
        tones: Tone::ALL.iter().map(Tone::label).collect(),
    })
}

fn parse_choice<T>(raw: Option<&str>) -> Result<T, ApiError>
where
    T: FromStr<Err = musemate_core::MuseError> + Default,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|e: musemate_core::MuseError| ApiError::BadRequest(e.to_string())),
    }
}

/// Handler for spark requests
async fn handle_spark(
    State(state): State<AppState>,
    Json(payload): Json<SparkBody>,
) -> Result<Json<SparkResponse>, ApiError> {
    let mood = payload.mood.as_deref().unwrap_or_default().trim();
    if mood.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_MOOD.to_string()));
    }
    let intent: Intent = parse_choice(payload.intent.as_deref())?;
    let tone: Tone = parse_choice(payload.tone.as_deref())?;

    let request = SparkRequest::new(mood, intent, tone);
    let conversation = build_conversation(&request.to_payload());
    let result = state.acquirer.acquire(&conversation).await;
    if let Some(diagnostic) = &result.diagnostic {
        info!(diagnostic = %diagnostic, "Served fallback spark");
    }

    let id = session_id(payload.session_id);
    let entry = HistoryEntry::new(intent, tone, result);
    let session = state
        .sessions
        .record_spark(&id, entry.clone(), state.session_idle)
        .await?;

    Ok(Json(SparkResponse {
        session_id: session.id,
        entry,
        history: session.history,
    }))
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SparkHistory>, ApiError> {
    let session = state.sessions.get_session(&id).await?;
    Ok(Json(session.history))
}

async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.clear_history(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.delete_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PNG of the latest spark, offered as a download
async fn download_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let session = state.sessions.get_session(&id).await?;
    let text = session
        .history
        .latest()
        .map(|entry| entry.spark.clone())
        .filter(|spark| !spark.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TEXT.to_string());

    let card = Arc::clone(&state.card);
    let png = tokio::task::spawn_blocking(move || card.render(&text))
        .await
        .map_err(|e| ApiError::InternalError(e.into()))?
        .map_err(|e| ApiError::InternalError(e.into()))?;

    let filename = format!(
        "attachment; filename=\"musemate_spark_{}.png\"",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        png,
    )
        .into_response())
}
