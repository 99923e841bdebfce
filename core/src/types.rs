use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::MuseError;

/// What the user wants out of today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Intent {
    Create,
    #[default]
    Plan,
    Move,
    Reflect,
}

impl Intent {
    pub const ALL: [Intent; 4] = [Intent::Create, Intent::Plan, Intent::Move, Intent::Reflect];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Create => "Create",
            Intent::Plan => "Plan",
            Intent::Move => "Move",
            Intent::Reflect => "Reflect",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = MuseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MuseError::ParsingError(format!("Unknown intent: {}", wanted)))
    }
}

/// Voice the coach answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tone {
    #[serde(rename = "Warm Big-Sis")]
    WarmBigSis,
    #[default]
    #[serde(rename = "Therapist-Gentle")]
    TherapistGentle,
    #[serde(rename = "Direct-but-Loving")]
    DirectButLoving,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::WarmBigSis, Tone::TherapistGentle, Tone::DirectButLoving];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::WarmBigSis => "Warm Big-Sis",
            Tone::TherapistGentle => "Therapist-Gentle",
            Tone::DirectButLoving => "Direct-but-Loving",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tone {
    type Err = MuseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tone::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MuseError::ParsingError(format!("Unknown tone: {}", wanted)))
    }
}

/// A validated spark request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkRequest {
    mood: String,
    intent: Intent,
    tone: Tone,
}

impl SparkRequest {
    pub fn new(mood: impl Into<String>, intent: Intent, tone: Tone) -> Self {
        Self {
            mood: mood.into(),
            intent,
            tone,
        }
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn to_payload(&self) -> PromptPayload {
        PromptPayload {
            mood: Some(self.mood.clone()),
            intent: Some(self.intent.label().to_string()),
            tone: Some(self.tone.label().to_string()),
        }
    }
}

/// Loosely-typed input accepted by the prompt builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub mood: Option<String>,
    pub intent: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: String) -> Self {
        Self {
            role: Role::System,
            content,
        }
    }

    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

/// The fixed two-message exchange sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    system: ChatMessage,
    user: ChatMessage,
}

impl Conversation {
    pub fn new(system: String, user: String) -> Self {
        Self {
            system: ChatMessage::system(system),
            user: ChatMessage::user(user),
        }
    }

    pub fn system(&self) -> &ChatMessage {
        &self.system
    }

    pub fn user(&self) -> &ChatMessage {
        &self.user
    }

    /// Messages in wire order: system, then user
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![self.system.clone(), self.user.clone()]
    }
}

/// spark/focus pair recovered from model output. Either field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkFields {
    pub spark: String,
    pub focus: String,
}

impl SparkFields {
    pub fn has_content(&self) -> bool {
        !self.spark.is_empty() || !self.focus.is_empty()
    }
}

/// Outcome handed back to callers; never an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkResult {
    pub spark: String,
    pub focus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl SparkResult {
    pub fn from_fields(fields: SparkFields) -> Self {
        Self {
            spark: fields.spark,
            focus: fields.focus,
            diagnostic: None,
        }
    }
}

//------------------------------------------------------------------------------
// OpenAI wire types
//------------------------------------------------------------------------------

/// Request body for `/v1/chat/completions`
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// Response from `/v1/chat/completions`
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Request body for `/v1/responses`. No structured-output mode.
#[derive(Serialize, Debug, Clone)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    pub temperature: f64,
}

/// Error envelope returned on non-2xx responses
#[derive(Deserialize, Debug)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct OpenAiErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse_is_case_insensitive() {
        assert_eq!("move".parse::<Intent>().unwrap(), Intent::Move);
        assert_eq!(" Reflect ".parse::<Intent>().unwrap(), Intent::Reflect);
        assert!("Dance".parse::<Intent>().is_err());
    }

    #[test]
    fn test_tone_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Tone::WarmBigSis).unwrap();
        assert_eq!(json, "\"Warm Big-Sis\"");
        assert_eq!("direct-but-loving".parse::<Tone>().unwrap(), Tone::DirectButLoving);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Intent::default(), Intent::Plan);
        assert_eq!(Tone::default(), Tone::TherapistGentle);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            temperature: 0.8,
            response_format: Some(ResponseFormat::json_object()),
            messages: vec![ChatMessage::user("hi".to_string())],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_response_tolerates_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
