use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::MuseConfig;
use crate::errors::{MuseError, MuseResult};
use crate::types::*;

/// The two remote calls the acquirer can make
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// `POST /v1/chat/completions`
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> MuseResult<ChatCompletionResponse>;

    /// `POST /v1/responses`. The body is returned untyped; its shape varies across API versions.
    async fn create_response(&self, request: &ResponsesRequest) -> MuseResult<Value>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// Type-erased backend shared across tasks
pub type SharedBackend = Arc<dyn CompletionBackend>;

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> MuseResult<ChatCompletionResponse> {
        (**self).chat_completion(request).await
    }

    async fn create_response(&self, request: &ResponsesRequest) -> MuseResult<Value> {
        (**self).create_response(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// A reply from either endpoint, with one text extraction rule per shape
#[derive(Debug, Clone)]
pub enum ApiReply {
    Chat(ChatCompletionResponse),
    Responses(Value),
}

impl ApiReply {
    pub fn text(&self) -> MuseResult<String> {
        match self {
            ApiReply::Chat(response) => chat_text(response),
            ApiReply::Responses(value) => Ok(responses_text(value)),
        }
    }
}

fn chat_text(response: &ChatCompletionResponse) -> MuseResult<String> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| MuseError::ResponseError("No choices in response".to_string()))?;

    if let Some(usage) = &response.usage {
        debug!(
            "Chat token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    if let Some(reason) = choice.finish_reason.as_deref() {
        if reason != "stop" {
            warn!("Chat completion finish reason: {}", reason);
        }
    }

    Ok(choice
        .message
        .content
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string())
}

/// `output[0].content[0].text`, else a top-level `content` string, else the whole body.
fn responses_text(value: &Value) -> String {
    if let Some(text) = value
        .pointer("/output/0/content/0/text")
        .and_then(Value::as_str)
    {
        return text.to_string();
    }
    match value.get("content").and_then(Value::as_str) {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => value.to_string(),
    }
}

/// Client for OpenAI-compatible chat services
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    model_name: String,
    base_url: String,
    http_client: Client,
}

impl OpenAiClient {
    /// Create a new client authenticated with `api_key`
    pub fn new(api_key: &str, config: &MuseConfig) -> MuseResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(MuseError::ConfigError("API key cannot be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| MuseError::ConfigError(format!("Invalid API key format: {}", e)))?,
        );

        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| MuseError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            model_name: config.model().to_string(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> MuseResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.api_url(path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| MuseError::from_send("Failed to send request", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| MuseError::from_send("Failed to read response", e))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(&response_text)
            {
                return Err(MuseError::ApiError {
                    message: error_response.error.message,
                    error_type: error_response
                        .error
                        .error_type
                        .unwrap_or_else(|| status.as_u16().to_string()),
                });
            }
            return Err(MuseError::HttpError {
                status_code: status.as_u16(),
                message: response_text,
            });
        }

        serde_json::from_str(&response_text)
            .map_err(|e| MuseError::ParsingError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> MuseResult<ChatCompletionResponse> {
        self.post_json("chat/completions", request).await
    }

    async fn create_response(&self, request: &ResponsesRequest) -> MuseResult<Value> {
        self.post_json("responses", request).await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
