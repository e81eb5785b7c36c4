use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::transcript::{Transcript, Turn};

/// A time-bounded interview. Descriptive fields are fixed at construction;
/// the transcript sits behind the session's own lock, which serializes turns.
pub struct Session {
    id: String,
    subject_url: Url,
    start_time: DateTime<Utc>,
    time_limit: Duration,
    active: AtomicBool,
    last_activity_ms: AtomicI64,
    transcript: Arc<Mutex<Transcript>>,
}

impl Session {
    /// Build a session whose transcript holds the interview brief
    pub fn new(subject_url: Url, time_limit: Duration, start_time: DateTime<Utc>) -> Self {
        let brief = Turn::interview_brief(subject_url.as_str(), time_limit);
        Self {
            id: Uuid::new_v4().to_string(),
            subject_url,
            start_time,
            time_limit,
            active: AtomicBool::new(true),
            last_activity_ms: AtomicI64::new(start_time.timestamp_millis()),
            transcript: Arc::new(Mutex::new(Transcript::seeded(brief))),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject_url(&self) -> &Url {
        &self.subject_url
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the session inactive. Returns false if it already was.
    pub fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        let ms = self.last_activity_ms.load(Ordering::Acquire);
        DateTime::from_timestamp_millis(ms).unwrap_or(self.start_time)
    }

    /// Record activity at `now`; never moves backwards
    pub fn touch(&self, now: DateTime<Utc>) {
        self.last_activity_ms
            .fetch_max(now.timestamp_millis(), Ordering::AcqRel);
    }

    /// Acquire exclusive access to the transcript for one turn.
    /// The guard releases the lock on every exit path, including cancellation.
    pub async fn lock_transcript(&self) -> OwnedMutexGuard<Transcript> {
        debug!("[{}] Acquiring transcript lock", self.id);
        let guard = self.transcript.clone().lock_owned().await;
        debug!("[{}] Transcript lock acquired", self.id);
        guard
    }

    /// Committed turns, waiting for any in-flight turn to finish
    pub async fn transcript(&self) -> Vec<Turn> {
        self.transcript.lock().await.turns().to_vec()
    }

    /// Only valid before the session is shared through the registry
    pub(crate) fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4().to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("subject_url", &self.subject_url.as_str())
            .field("start_time", &self.start_time)
            .field("time_limit", &self.time_limit)
            .field("active", &self.is_active())
            .finish()
    }
}
