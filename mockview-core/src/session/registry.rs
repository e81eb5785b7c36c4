use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::Session;
use crate::SessionError;

/// Process-wide map from session id to session.
///
/// The lock protects the map only: lookups share it, inserts and removals take
/// it exclusively. Session contents are guarded by each session's own lock.
/// Cheap to clone.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully built session and return the shared handle.
    /// An id collision draws a fresh id instead of failing.
    pub async fn create(&self, mut session: Session) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;

        while sessions.contains_key(session.id()) {
            warn!("[{}] Session id collision, drawing a new id", session.id());
            session.regenerate_id();
        }

        let session = Arc::new(session);
        sessions.insert(session.id().to_string(), session.clone());
        info!("[{}] Session registered ({} live)", session.id(), sessions.len());
        session
    }

    /// Look up a session. Its fields may change as soon as this returns.
    pub async fn get(&self, session_id: &str) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::not_found(session_id))
    }

    pub async fn remove(&self, session_id: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_some() {
            info!("[{}] Session removed from registry", session_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Number of sessions still accepting turns
    pub async fn active_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_active())
            .count()
    }
}
