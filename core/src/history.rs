use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{Intent, SparkResult, Tone};

/// Number of sparks kept per history
pub const HISTORY_LIMIT: usize = 5;

/// One recorded generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "utc_seconds")]
    pub ts: DateTime<Utc>,
    pub intent: Intent,
    pub tone: Tone,
    pub spark: String,
    pub focus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl HistoryEntry {
    /// Stamps a result with the current time. spark/focus are trimmed.
    pub fn new(intent: Intent, tone: Tone, result: SparkResult) -> Self {
        Self::at(Utc::now(), intent, tone, result)
    }

    pub fn at(ts: DateTime<Utc>, intent: Intent, tone: Tone, result: SparkResult) -> Self {
        Self {
            ts,
            intent,
            tone,
            spark: result.spark.trim().to_string(),
            focus: result.focus.trim().to_string(),
            diagnostic: result.diagnostic,
        }
    }

    /// `2024-05-01T09:30:00Z`
    pub fn timestamp(&self) -> String {
        self.ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

mod utc_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// The most recent sparks, newest first, never more than [`HISTORY_LIMIT`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparkHistory {
    entries: VecDeque<HistoryEntry>,
}

impl SparkHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front, dropping the oldest entry past the limit
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::at(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, n as u32).unwrap(),
            Intent::Plan,
            Tone::TherapistGentle,
            SparkResult {
                spark: format!(" spark {} ", n),
                focus: format!("focus {}", n),
                diagnostic: None,
            },
        )
    }

    #[test]
    fn test_keeps_five_newest_first() {
        let mut history = SparkHistory::new();
        for n in 0..7 {
            history.record(entry(n));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        let sparks: Vec<&str> = history.iter().map(|e| e.spark.as_str()).collect();
        assert_eq!(sparks, vec!["spark 6", "spark 5", "spark 4", "spark 3", "spark 2"]);
        assert_eq!(history.latest().unwrap().focus, "focus 6");
    }

    #[test]
    fn test_clear() {
        let mut history = SparkHistory::new();
        history.record(entry(1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(entry(5).timestamp(), "2024-05-01T09:30:05Z");
    }

    #[test]
    fn test_serializes_as_list() {
        let mut history = SparkHistory::new();
        history.record(entry(1));
        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value[0]["ts"], "2024-05-01T09:30:01Z");
        assert_eq!(value[0]["tone"], "Therapist-Gentle");
        assert!(value[0].get("diagnostic").is_none());

        let back: SparkHistory = serde_json::from_value(value).unwrap();
        assert_eq!(back, history);
    }
}
