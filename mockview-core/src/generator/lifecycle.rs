use std::sync::Arc;

use chrono::Utc;
use mockview_llm::ChatMessage;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::transcript::{Transcript, Turn};

/// Per-turn state machine:
/// `Idle -> Requesting -> {Streaming -> Committed | Streaming -> Aborted} | {Requesting -> Committed | Requesting -> Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Requesting,
    Streaming,
    Committed,
    Failed,
    Aborted,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Committed | TurnState::Failed | TurnState::Aborted)
    }
}

/// What a turn adds on top of the committed transcript
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    /// User turn committed together with the model's answer
    pub pending: Option<Turn>,
    /// Deactivate the session once this turn commits
    pub closing: bool,
}

impl TurnInput {
    /// Opening turn: the transcript already holds the brief
    pub fn opening() -> Self {
        Self::default()
    }

    pub fn reply(turn: Turn, closing: bool) -> Self {
        Self {
            pending: Some(turn),
            closing,
        }
    }
}

/// Holds the session's transcript lock for the duration of one turn.
///
/// Nothing reaches the transcript unless `commit` runs. Dropping the lifecycle
/// before a terminal state (client gone mid-stream, request cancelled) leaves
/// the transcript untouched and releases the lock for the next turn.
pub struct TurnLifecycle {
    transcript: OwnedMutexGuard<Transcript>,
    session: Arc<Session>,
    input: TurnInput,
    state: TurnState,
}

impl TurnLifecycle {
    pub fn new(session: Arc<Session>, transcript: OwnedMutexGuard<Transcript>, input: TurnInput) -> Self {
        Self {
            transcript,
            session,
            input,
            state: TurnState::Idle,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Committed history followed by the pending user turn
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.to_messages(self.input.pending.as_ref())
    }

    pub fn transition(&mut self, next: TurnState) {
        debug!("[{}] Turn {:?} -> {:?}", self.session.id(), self.state, next);
        self.state = next;
    }

    /// Append the pending user turn and the model turn, then record activity
    pub fn commit(&mut self, text: String) {
        if let Some(pending) = self.input.pending.take() {
            self.transcript.push(pending);
        }
        self.transcript.push(Turn::model(text));
        self.session.touch(Utc::now());
        self.transition(TurnState::Committed);
        info!("[{}] Turn committed ({} turns)", self.session.id(), self.transcript.len());

        if self.input.closing && self.session.deactivate() {
            info!("[{}] Time budget spent, closing turn delivered; session is now inactive", self.session.id());
        }
    }

    /// End the turn without touching the transcript
    pub fn discard(&mut self, outcome: TurnState, reason: &dyn std::fmt::Display) {
        warn!("[{}] Turn {:?}: {}", self.session.id(), outcome, reason);
        self.transition(outcome);
    }
}

impl Drop for TurnLifecycle {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            warn!(
                "[{}] Turn abandoned while {:?} (caller went away); nothing committed",
                self.session.id(),
                self.state
            );
            self.state = TurnState::Aborted;
        }
        debug!("[{}] Releasing transcript lock", self.session.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use std::time::Duration;

    fn session() -> Arc<Session> {
        Arc::new(Session::new(
            Url::parse("https://example.com/post").unwrap(),
            Duration::from_secs(300),
            Utc::now(),
        ))
    }

    #[tokio::test]
    async fn commit_appends_pending_then_model() {
        let session = session();
        let guard = session.lock_transcript().await;
        let pending = Turn::candidate_reply("shard by user id", Duration::from_secs(100), false);
        let mut lifecycle = TurnLifecycle::new(session.clone(), guard, TurnInput::reply(pending, false));

        assert_eq!(lifecycle.messages().len(), 2);
        lifecycle.commit("Why user id?".into());
        assert_eq!(lifecycle.state(), TurnState::Committed);
        drop(lifecycle);

        let turns = session.transcript().await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].segments()[0], "shard by user id");
        assert_eq!(turns[2].text(), "Why user id?");
        assert!(session.is_active());
    }

    #[tokio::test]
    async fn closing_commit_deactivates() {
        let session = session();
        let guard = session.lock_transcript().await;
        let pending = Turn::candidate_reply("thanks", Duration::ZERO, true);
        let mut lifecycle = TurnLifecycle::new(session.clone(), guard, TurnInput::reply(pending, true));
        lifecycle.commit("Good luck!".into());
        drop(lifecycle);
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn dropped_lifecycle_commits_nothing_and_releases_lock() {
        let session = session();
        let guard = session.lock_transcript().await;
        let pending = Turn::candidate_reply("partial", Duration::from_secs(100), false);
        let mut lifecycle = TurnLifecycle::new(session.clone(), guard, TurnInput::reply(pending, false));
        lifecycle.transition(TurnState::Streaming);
        drop(lifecycle);

        let turns = tokio::time::timeout(Duration::from_millis(100), session.transcript())
            .await
            .expect("lock released");
        assert_eq!(turns.len(), 1);
    }
}
