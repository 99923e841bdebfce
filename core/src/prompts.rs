use crate::types::{Conversation, PromptPayload};

pub const MAX_MOOD_CHARS: usize = 600;
pub const DEFAULT_INTENT: &str = "Plan";
pub const DEFAULT_TONE: &str = "Therapist-Gentle";

pub const SYSTEM_PROMPT: &str = "You are MuseMate, a supportive coach for productivity and creativity. \
Your style is warm, concise, and human. \
Return JSON with keys: spark, focus. \
spark is 1-2 lines that clarify, encourage, or inspire. \
focus is one tiny, concrete step the user can take today. \
Match the selected tone: Warm Big-Sis (playful hype), Therapist-Gentle (calm, validating), \
Direct-but-Loving (clear but kind). Avoid cliches. Keep total under ~70 words. \
If the user expresses distress, use grounding language and suggest seeking support as appropriate.";

/// Builds the system + user exchange for a payload.
///
/// The user message is a small hand-built JSON object. Double quotes in the
/// embedded values become single quotes so the wrapper stays well-formed.
pub fn build_conversation(payload: &PromptPayload) -> Conversation {
    let mood: String = payload
        .mood
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(MAX_MOOD_CHARS)
        .collect();
    let intent = or_default(payload.intent.as_deref(), DEFAULT_INTENT);
    let tone = or_default(payload.tone.as_deref(), DEFAULT_TONE);

    let user_content = format!(
        "{{\"mood\":\"{}\",\"intent\":\"{}\",\"tone\":\"{}\"}}",
        escape_quotes(&mood),
        escape_quotes(intent),
        escape_quotes(tone)
    );

    Conversation::new(SYSTEM_PROMPT.to_string(), user_content)
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Intent, Role, SparkRequest, Tone};
    use serde_json::Value;

    fn payload(mood: &str, intent: Option<&str>, tone: Option<&str>) -> PromptPayload {
        PromptPayload {
            mood: Some(mood.to_string()),
            intent: intent.map(str::to_string),
            tone: tone.map(str::to_string),
        }
    }

    fn user_json(conversation: &Conversation) -> Value {
        serde_json::from_str(&conversation.user().content).unwrap()
    }

    #[test]
    fn test_two_messages_in_order() {
        let conversation = build_conversation(&payload("test", Some("Plan"), Some("Therapist-Gentle")));
        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("mood"));
        assert!(messages[1].content.contains("intent"));
        assert!(messages[1].content.contains("tone"));
    }

    #[test]
    fn test_mood_truncated_to_600_chars() {
        let mood = "x".repeat(1000);
        let conversation = build_conversation(&payload(&mood, None, None));
        let value = user_json(&conversation);
        assert_eq!(value["mood"].as_str().unwrap().chars().count(), 600);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let mood = "é".repeat(700);
        let conversation = build_conversation(&payload(&mood, None, None));
        let value = user_json(&conversation);
        assert_eq!(value["mood"].as_str().unwrap(), "é".repeat(600));
    }

    #[test]
    fn test_quotes_keep_user_content_parseable() {
        let conversation = build_conversation(&payload("He said \"go\"", Some("Pl\"an"), None));
        let value = user_json(&conversation);
        assert_eq!(value["mood"], "He said 'go'");
        assert_eq!(value["intent"], "Pl'an");
    }

    #[test]
    fn test_blank_intent_and_tone_fall_back() {
        let conversation = build_conversation(&payload("tired", Some("   "), None));
        let value = user_json(&conversation);
        assert_eq!(value["intent"], DEFAULT_INTENT);
        assert_eq!(value["tone"], DEFAULT_TONE);
    }

    #[test]
    fn test_missing_mood_is_empty() {
        let conversation = build_conversation(&PromptPayload::default());
        assert_eq!(user_json(&conversation)["mood"], "");
    }

    #[test]
    fn test_typed_request_is_deterministic() {
        let request = SparkRequest::new("nervous about a talk", Intent::Move, Tone::WarmBigSis);
        let first = build_conversation(&request.to_payload());
        let second = build_conversation(&request.to_payload());
        assert_eq!(first, second);
        assert_eq!(
            first.user().content,
            "{\"mood\":\"nervous about a talk\",\"intent\":\"Move\",\"tone\":\"Warm Big-Sis\"}"
        );
        assert_eq!(first.system().content, SYSTEM_PROMPT);
    }
}
