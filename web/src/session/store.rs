use std::error::Error;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use musemate_core::{HistoryEntry, SparkHistory};

/// Error type for session store operations
#[derive(Debug)]
pub enum SessionStoreError {
    /// Session not found
    NotFound(String),
    /// Error occurred during a store operation
    StorageError(String),
}

impl Display for SessionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStoreError::NotFound(id) => write!(f, "Session not found: {}", id),
            SessionStoreError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl Error for SessionStoreError {}

/// One browser session and its recent sparks
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last time the session was accessed or modified
    pub updated_at: DateTime<Utc>,
    /// Optional time when the session expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Most recent sparks, newest first
    pub history: SparkHistory,
}

impl Session {
    /// Create a new session with the given ID
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            expires_at: None,
            history: SparkHistory::new(),
        }
    }

    /// Add a spark to the front of the history
    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.record(entry);
        self.updated_at = Utc::now();
    }

    /// Drop every recorded spark
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.updated_at = Utc::now();
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }

    /// Set the expiration time for this session
    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Push the expiry `idle` past now
    pub fn touch(&mut self, idle: Duration) {
        self.set_expiry(Utc::now() + idle);
    }
}

/// Trait defining the interface for session stores
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Create a new session with the given ID, replacing any previous one
    async fn create_session(&self, id: String) -> Result<Session, SessionStoreError>;

    /// Get a live session by ID
    async fn get_session(&self, id: &str) -> Result<Session, SessionStoreError>;

    /// Save changes to a session
    async fn save_session(&self, session: Session) -> Result<(), SessionStoreError>;

    /// Record a spark in one step: the live session with `id` gets the entry
    /// and a fresh expiry; an unknown or expired one is replaced by a new
    /// session holding just this entry. Returns the updated session.
    async fn record_spark(
        &self,
        id: &str,
        entry: HistoryEntry,
        idle: Duration,
    ) -> Result<Session, SessionStoreError>;

    /// Empty the history of a live session
    async fn clear_history(&self, id: &str) -> Result<(), SessionStoreError>;

    /// Delete a session by ID
    async fn delete_session(&self, id: &str) -> Result<(), SessionStoreError>;

    /// Delete expired sessions
    async fn cleanup_expired_sessions(&self) -> Result<usize, SessionStoreError>;
}

/// Type alias for Arc-wrapped SessionStore trait objects
pub type SessionStoreRef = Arc<dyn SessionStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use musemate_core::{Intent, SparkResult, Tone};
    use std::thread;
    use std::time::Duration as StdDuration;

    fn entry(spark: &str) -> HistoryEntry {
        HistoryEntry::at(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            Intent::Move,
            Tone::DirectButLoving,
            SparkResult {
                spark: spark.to_string(),
                focus: "Walk around the block.".to_string(),
                diagnostic: None,
            },
        )
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new("test_id".to_string());

        assert_eq!(session.id, "test_id");
        assert!(session.history.is_empty());
        assert_eq!(session.expires_at, None);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_record_and_clear() {
        let mut session = Session::new("test_id".to_string());
        session.record(entry("first"));
        session.record(entry("second"));

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.latest().unwrap().spark, "second");

        session.clear_history();
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_session_expiry() {
        let mut session = Session::new("test_id".to_string());

        session.touch(Duration::seconds(60));
        assert!(!session.is_expired());

        session.set_expiry(Utc::now() - Duration::seconds(1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_updated_at_changes() {
        let mut session = Session::new("test_id".to_string());
        let initial_updated_at = session.updated_at;

        thread::sleep(StdDuration::from_millis(5));
        session.record(entry("spark"));
        assert!(session.updated_at > initial_updated_at);

        let after_record = session.updated_at;
        thread::sleep(StdDuration::from_millis(5));
        session.clear_history();
        assert!(session.updated_at > after_record);
    }
}
