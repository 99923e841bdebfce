use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use musemate_core::HistoryEntry;
use tracing::{debug, info};

use crate::session::store::{Session, SessionStore, SessionStoreError};

/// In-memory implementation of SessionStore
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    /// Thread-safe storage of sessions
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    /// Create a new InMemorySessionStore
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> SessionStoreError {
    SessionStoreError::StorageError(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, id: String) -> Result<Session, SessionStoreError> {
        let session = Session::new(id.clone());

        let mut sessions = self.sessions.write().map_err(lock_error)?;
        sessions.insert(id, session.clone());
        debug!("Created session: {}", session.id);

        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Session, SessionStoreError> {
        let sessions = self.sessions.read().map_err(lock_error)?;

        let session = sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(id.to_string()))?;

        if session.is_expired() {
            debug!("Session expired: {}", id);
            return Err(SessionStoreError::NotFound(id.to_string()));
        }

        Ok(session)
    }

    async fn record_spark(
        &self,
        id: &str,
        entry: HistoryEntry,
        idle: Duration,
    ) -> Result<Session, SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;

        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id.to_string()));
        if session.is_expired() {
            info!("Replacing expired session {}", id);
            *session = Session::new(id.to_string());
        }
        session.record(entry);
        session.touch(idle);

        Ok(session.clone())
    }

    async fn clear_history(&self, id: &str) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;

        match sessions.get_mut(id) {
            Some(session) if !session.is_expired() => {
                session.clear_history();
                Ok(())
            }
            _ => Err(SessionStoreError::NotFound(id.to_string())),
        }
    }

    async fn save_session(&self, session: Session) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;

        if sessions.remove(id).is_none() {
            return Err(SessionStoreError::NotFound(id.to_string()));
        }

        debug!("Deleted session: {}", id);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;

        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at.map_or(true, |at| at > now));
        let count = before - sessions.len();

        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musemate_core::{Intent, SparkResult, Tone};
    use tokio::test;

    fn entry(spark: &str) -> HistoryEntry {
        HistoryEntry::new(
            Intent::Reflect,
            Tone::WarmBigSis,
            SparkResult {
                spark: spark.to_string(),
                focus: "Journal for five minutes.".to_string(),
                diagnostic: None,
            },
        )
    }

    #[test]
    async fn test_create_and_get_session() {
        let store = InMemorySessionStore::new();
        let session_id = "test_session_1".to_string();

        let session = store.create_session(session_id.clone()).await.unwrap();
        assert_eq!(session.id, session_id);

        let retrieved = store.get_session(&session_id).await.unwrap();
        assert_eq!(retrieved.id, session_id);
    }

    #[test]
    async fn test_saved_history_round_trips() {
        let store = InMemorySessionStore::new();
        let session_id = "test_session_2".to_string();

        let mut session = store.create_session(session_id.clone()).await.unwrap();
        session.record(entry("You got this."));
        store.save_session(session).await.unwrap();

        let retrieved = store.get_session(&session_id).await.unwrap();
        assert_eq!(retrieved.history.len(), 1);
        assert_eq!(retrieved.history.latest().unwrap().spark, "You got this.");
    }

    #[test]
    async fn test_delete_session() {
        let store = InMemorySessionStore::new();
        let session_id = "test_session_3".to_string();

        store.create_session(session_id.clone()).await.unwrap();
        store.delete_session(&session_id).await.unwrap();

        let result = store.get_session(&session_id).await;
        assert!(matches!(result, Err(SessionStoreError::NotFound(_))));

        let again = store.delete_session(&session_id).await;
        assert!(matches!(again, Err(SessionStoreError::NotFound(_))));
    }

    #[test]
    async fn test_session_expiry() {
        let store = InMemorySessionStore::new();
        let session_id = "test_session_4".to_string();

        let mut session = store.create_session(session_id.clone()).await.unwrap();
        session.set_expiry(Utc::now() - Duration::seconds(1));
        store.save_session(session).await.unwrap();

        match store.get_session(&session_id).await {
            Err(e @ SessionStoreError::NotFound(_)) => {
                assert_eq!(e.to_string(), "Session not found: test_session_4");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let mut live = store.create_session("live".to_string()).await.unwrap();
        live.touch(Duration::minutes(5));
        store.save_session(live).await.unwrap();

        assert_eq!(store.cleanup_expired_sessions().await.unwrap(), 1);
        assert!(store.get_session("live").await.is_ok());
    }

    #[test]
    async fn test_record_spark_creates_then_appends() {
        let store = InMemorySessionStore::new();

        let first = store
            .record_spark("fresh", entry("one"), Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(first.history.len(), 1);
        assert!(!first.is_expired());

        let second = store
            .record_spark("fresh", entry("two"), Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(second.history.len(), 2);
        assert_eq!(second.history.latest().unwrap().spark, "two");
    }

    #[test]
    async fn test_record_spark_replaces_expired_session() {
        let store = InMemorySessionStore::new();
        let mut old = store.create_session("stale".to_string()).await.unwrap();
        old.record(entry("old"));
        old.set_expiry(Utc::now() - Duration::seconds(1));
        store.save_session(old).await.unwrap();

        let session = store
            .record_spark("stale", entry("new"), Duration::minutes(5))
            .await
            .unwrap();
        let sparks: Vec<&str> = session.history.iter().map(|e| e.spark.as_str()).collect();
        assert_eq!(sparks, vec!["new"]);
    }

    #[test]
    async fn test_concurrent_records_are_all_kept() {
        let store = Arc::new(InMemorySessionStore::new());

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .record_spark("shared", entry(&format!("spark {}", n)), Duration::minutes(5))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_session("shared").await.unwrap().history.len(), 4);
    }

    #[test]
    async fn test_clear_history() {
        let store = InMemorySessionStore::new();
        store
            .record_spark("s", entry("one"), Duration::minutes(5))
            .await
            .unwrap();

        store.clear_history("s").await.unwrap();
        assert!(store.get_session("s").await.unwrap().history.is_empty());

        let missing = store.clear_history("nope").await;
        assert!(matches!(missing, Err(SessionStoreError::NotFound(_))));
    }
}
