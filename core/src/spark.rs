//! Spark acquisition: two remote attempts, JSON recovery, then a static fallback.
//!
//! ```text
//! INIT -> PRIMARY_ATTEMPT -> (backoff) -> SECONDARY_ATTEMPT -> FALLBACK
//!             |                               |
//!             +------------> DONE <-----------+
//! ```
//!
//! No path returns an error. Failures are folded into the optional
//! `diagnostic` of the fallback result.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::client::{ApiReply, CompletionBackend, OpenAiClient};
use crate::config::MuseConfig;
use crate::errors::MuseResult;
use crate::extract::extract_spark_fields;
use crate::types::*;

pub const FALLBACK_SPARK: &str = "Take one gentle step. You do not need to earn your own support.";
pub const FALLBACK_FOCUS: &str =
    "Set a 5-minute timer and write three bullet points about what you want today.";

pub const NO_API_KEY: &str = "No API key loaded";
const UNKNOWN_ERROR: &str = "Unknown error";

const PRIMARY_TEMPERATURE: f64 = 0.8;
const SECONDARY_TEMPERATURE: f64 = 0.3;

/// The offline payload, carrying whatever went wrong
pub fn fallback_result(diagnostics: &[String]) -> SparkResult {
    let diagnostic = if diagnostics.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        diagnostics.join(" | ")
    };
    SparkResult {
        spark: FALLBACK_SPARK.to_string(),
        focus: FALLBACK_FOCUS.to_string(),
        diagnostic: Some(diagnostic),
    }
}

enum Stage<'a, B> {
    Init,
    Primary(&'a B),
    Secondary(&'a B, Vec<String>),
    Fallback(Vec<String>),
    Done(SparkResult),
}

/// Result of one remote attempt
enum Attempt {
    Recovered(SparkFields),
    Failed(String),
}

/// Runs the two-attempt pipeline against a backend
#[derive(Debug, Clone)]
pub struct SparkAcquirer<B> {
    backend: Option<B>,
    backoff: Duration,
}

impl<B: CompletionBackend> SparkAcquirer<B> {
    /// `backend` is `None` when no credential is available
    pub fn new(backend: Option<B>, backoff: Duration) -> Self {
        Self { backend, backoff }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn acquire(&self, conversation: &Conversation) -> SparkResult {
        let mut stage = Stage::Init;
        loop {
            stage = match stage {
                Stage::Init => match &self.backend {
                    Some(backend) => Stage::Primary(backend),
                    None => Stage::Fallback(vec![NO_API_KEY.to_string()]),
                },
                Stage::Primary(backend) => {
                    match self.primary_attempt(backend, conversation).await {
                        Attempt::Recovered(fields) => Stage::Done(SparkResult::from_fields(fields)),
                        Attempt::Failed(diagnostic) => {
                            warn!("Primary attempt failed: {}", diagnostic);
                            tokio::time::sleep(self.backoff).await;
                            Stage::Secondary(backend, vec![diagnostic])
                        }
                    }
                }
                Stage::Secondary(backend, mut diagnostics) => {
                    match self.secondary_attempt(backend, conversation).await {
                        Attempt::Recovered(fields) => Stage::Done(SparkResult::from_fields(fields)),
                        Attempt::Failed(diagnostic) => {
                            warn!("Secondary attempt failed: {}", diagnostic);
                            diagnostics.push(diagnostic);
                            Stage::Fallback(diagnostics)
                        }
                    }
                }
                Stage::Fallback(diagnostics) => {
                    info!("Using fallback spark");
                    Stage::Done(fallback_result(&diagnostics))
                }
                Stage::Done(result) => return result,
            };
        }
    }

    async fn primary_attempt(&self, backend: &B, conversation: &Conversation) -> Attempt {
        let request = ChatCompletionRequest {
            model: backend.model_name().to_string(),
            temperature: PRIMARY_TEMPERATURE,
            response_format: Some(ResponseFormat::json_object()),
            messages: conversation.messages(),
        };
        debug!("Primary attempt via chat completions, model {}", request.model);

        let reply = backend.chat_completion(&request).await.map(ApiReply::Chat);
        judge(&format!("chat({})", PRIMARY_TEMPERATURE), reply)
    }

    async fn secondary_attempt(&self, backend: &B, conversation: &Conversation) -> Attempt {
        let request = ResponsesRequest {
            model: backend.model_name().to_string(),
            input: responses_prompt(conversation),
            temperature: SECONDARY_TEMPERATURE,
        };
        debug!("Secondary attempt via responses, model {}", request.model);

        let reply = backend.create_response(&request).await.map(ApiReply::Responses);
        judge(&format!("responses({})", SECONDARY_TEMPERATURE), reply)
    }
}

/// Single-string prompt for the responses endpoint
pub fn responses_prompt(conversation: &Conversation) -> String {
    format!(
        "{}\n\nReturn JSON with keys: spark, focus (no extra text).\n\nUSER: {}",
        conversation.system().content,
        conversation.user().content
    )
}

fn judge(label: &str, reply: MuseResult<ApiReply>) -> Attempt {
    let text = match reply.and_then(|reply| reply.text()) {
        Ok(text) => text,
        Err(e) => return Attempt::Failed(format!("{} {}: {}", label, e.kind(), e)),
    };
    match extract_spark_fields(&text) {
        Some(fields) if fields.has_content() => Attempt::Recovered(fields),
        _ => Attempt::Failed(format!("{} returned empty/invalid JSON", label)),
    }
}

/// Entry point for callers holding an optional credential
pub async fn generate_spark(
    conversation: &Conversation,
    api_key: Option<&str>,
    config: &MuseConfig,
) -> SparkResult {
    let api_key = api_key.map(str::trim).filter(|key| !key.is_empty());
    let backend = match api_key {
        Some(key) => match OpenAiClient::new(key, config) {
            Ok(client) => Some(client),
            Err(e) => return fallback_result(&[format!("{}: {}", e.kind(), e)]),
        },
        None => None,
    };
    SparkAcquirer::new(backend, config.backoff())
        .acquire(conversation)
        .await
}
