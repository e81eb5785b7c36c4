//! Ordered conversation log of a session.

use std::time::Duration;

use mockview_llm::{ChatMessage, Role};
use serde::Serialize;

/// One role-tagged unit of conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    segments: Vec<String>,
}

impl Turn {
    pub fn new(role: Role, segments: Vec<String>) -> Self {
        Self { role, segments }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![text.into()])
    }

    /// Synthetic opening turn describing what the interview is about
    pub fn interview_brief(subject_url: &str, time_limit: Duration) -> Self {
        Self::new(
            Role::User,
            vec![
                format!("articleLink: {}", subject_url),
                format!("timeLimitSeconds: {}", time_limit.as_secs()),
            ],
        )
    }

    /// Candidate reply annotated with the remaining time budget
    pub fn candidate_reply(text: &str, remaining: Duration, expired: bool) -> Self {
        let budget = if expired {
            "timeRemaining: 0 seconds (time is over, conclude the interview now)".to_string()
        } else {
            format!("timeRemaining: {} seconds", remaining.as_secs())
        };
        Self::new(Role::User, vec![text.to_string(), budget])
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments joined by newlines
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        ChatMessage::new(turn.role, turn.segments.clone())
    }
}

/// Append-only sequence of committed turns. Order is the model's context.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(turn: Turn) -> Self {
        Self { turns: vec![turn] }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Full history plus an optional not-yet-committed turn, as backend messages
    pub fn to_messages(&self, pending: Option<&Turn>) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .chain(pending)
            .map(ChatMessage::from)
            .collect()
    }
}
