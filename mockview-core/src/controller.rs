//! Session Lifecycle Controller: entry point for starting interviews and
//! submitting candidate replies.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockview_llm::Role;
use reqwest::Url;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::budget;
use crate::generator::{TurnGenerator, TurnInput, TurnStream};
use crate::session::{Session, SessionRegistry};
use crate::transcript::{Transcript, Turn};
use crate::SessionError;

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Used when a start request has no positive time limit
    pub default_time_limit: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

/// Result of a buffered turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutput {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub text: String,
}

/// Point-in-time description of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub subject_url: String,
    pub start_time: DateTime<Utc>,
    pub time_limit_seconds: u64,
    pub remaining_seconds: u64,
    pub expired: bool,
    pub active: bool,
    pub last_activity: DateTime<Utc>,
    pub turns: Vec<TurnView>,
}

pub struct SessionController {
    registry: SessionRegistry,
    generator: TurnGenerator,
    config: ControllerConfig,
}

impl SessionController {
    pub fn new(registry: SessionRegistry, generator: TurnGenerator, config: ControllerConfig) -> Self {
        Self {
            registry,
            generator,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Start an interview and wait for the opening question.
    /// The session becomes visible only after the opening turn committed.
    pub async fn start_session(
        &self,
        subject_reference: &str,
        time_limit_seconds: Option<i64>,
    ) -> Result<TurnOutput, SessionError> {
        let session = Arc::new(self.new_session(subject_reference, time_limit_seconds)?);
        info!("[{}] Starting session for {}", session.id(), session.subject_url());

        let guard = session.lock_transcript().await;
        let message = self
            .generator
            .generate(session.clone(), guard, TurnInput::opening())
            .await?;

        // generate() has dropped its handle, so this is the only one left
        let session = Arc::into_inner(session)
            .ok_or_else(|| SessionError::BackendUnavailable("opening turn still holds the session".into()))?;
        let session = self.registry.create(session).await;

        Ok(TurnOutput {
            session_id: session.id().to_string(),
            message,
        })
    }

    /// Start an interview and stream the opening question.
    ///
    /// The session is registered before its id is returned, with its
    /// transcript lock already held by the opening turn, so early replies
    /// queue behind it. A failed opening turn leaves the session registered
    /// with only its brief.
    pub async fn start_session_streaming(
        &self,
        subject_reference: &str,
        time_limit_seconds: Option<i64>,
    ) -> Result<(String, TurnStream), SessionError> {
        let session = self.new_session(subject_reference, time_limit_seconds)?;
        let guard = session.lock_transcript().await;
        let session = self.registry.create(session).await;
        info!("[{}] Starting session for {} (streaming)", session.id(), session.subject_url());

        let stream = self.generator.stream(session.clone(), guard, TurnInput::opening());
        Ok((session.id().to_string(), stream))
    }

    /// Submit a candidate reply and wait for the interviewer's answer
    pub async fn submit_message(&self, session_id: &str, user_text: &str) -> Result<TurnOutput, SessionError> {
        let (session, guard, input) = self.begin_reply(session_id, user_text).await?;
        let message = self.generator.generate(session.clone(), guard, input).await?;
        Ok(TurnOutput {
            session_id: session.id().to_string(),
            message,
        })
    }

    /// Submit a candidate reply and stream the interviewer's answer
    pub async fn submit_message_streaming(&self, session_id: &str, user_text: &str) -> Result<TurnStream, SessionError> {
        let (session, guard, input) = self.begin_reply(session_id, user_text).await?;
        Ok(self.generator.stream(session, guard, input))
    }

    /// Deactivate a session and drop it from the registry
    pub async fn close_session(&self, session_id: &str) -> Result<(), SessionError> {
        let session = self
            .registry
            .remove(session_id)
            .await
            .ok_or_else(|| SessionError::not_found(session_id))?;
        session.deactivate();
        info!("[{}] Session closed", session_id);
        Ok(())
    }

    /// Describe a session, including its committed transcript.
    /// Waits for an in-flight turn to finish.
    pub async fn session_view(&self, session_id: &str) -> Result<SessionView, SessionError> {
        let session = self.registry.get(session_id).await?;
        let turns = session
            .transcript()
            .await
            .iter()
            .map(|t| TurnView {
                role: t.role(),
                text: t.text(),
            })
            .collect();

        let now = Utc::now();
        Ok(SessionView {
            session_id: session.id().to_string(),
            subject_url: session.subject_url().to_string(),
            start_time: session.start_time(),
            time_limit_seconds: session.time_limit().as_secs(),
            remaining_seconds: budget::remaining(&session, now).as_secs(),
            expired: budget::is_expired(&session, now),
            active: session.is_active(),
            last_activity: session.last_activity(),
            turns,
        })
    }

    fn new_session(&self, subject_reference: &str, time_limit_seconds: Option<i64>) -> Result<Session, SessionError> {
        let subject_url = parse_subject(subject_reference)?;
        let time_limit = self.resolve_time_limit(time_limit_seconds);
        Ok(Session::new(subject_url, time_limit, Utc::now()))
    }

    fn resolve_time_limit(&self, time_limit_seconds: Option<i64>) -> Duration {
        match time_limit_seconds {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            _ => self.config.default_time_limit,
        }
    }

    async fn active_session(&self, session_id: &str) -> Result<Arc<Session>, SessionError> {
        let session = self.registry.get(session_id).await?;
        if !session.is_active() {
            return Err(SessionError::not_found(session_id));
        }
        Ok(session)
    }

    /// Validate a reply and take the session's turn lock
    async fn begin_reply(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<(Arc<Session>, OwnedMutexGuard<Transcript>, TurnInput), SessionError> {
        let session = self.active_session(session_id).await?;
        if user_text.trim().is_empty() {
            return Err(SessionError::invalid_input("user message cannot be empty"));
        }

        let guard = session.lock_transcript().await;
        // closed, or its closing turn committed, while we were queued
        if !session.is_active() {
            return Err(SessionError::not_found(session_id));
        }

        let now = Utc::now();
        let expired = budget::is_expired(&session, now);
        let remaining = budget::remaining(&session, now);
        if expired {
            info!("[{}] Time budget exceeded, this reply gets the closing turn", session_id);
        }

        let turn = Turn::candidate_reply(user_text, remaining, expired);
        Ok((session, guard, TurnInput::reply(turn, expired)))
    }
}

/// Accept only absolute locators with a scheme and a host
fn parse_subject(subject_reference: &str) -> Result<Url, SessionError> {
    let subject_reference = subject_reference.trim();
    if subject_reference.is_empty() {
        return Err(SessionError::invalid_input("a valid 'articleLink' is required"));
    }

    let url = Url::parse(subject_reference)
        .map_err(|e| SessionError::invalid_input(format!("'articleLink' is not a valid URL: {}", e)))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(SessionError::invalid_input("'articleLink' must include a host")),
    }
}
