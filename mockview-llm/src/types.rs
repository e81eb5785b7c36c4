use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message as sent to the completion backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<String>,
}

impl ChatMessage {
    pub fn new(role: Role, parts: Vec<String>) -> Self {
        Self { role, parts }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![text.into()])
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![text.into()])
    }
}

/// Everything the stateless backend needs for one exchange: the static
/// instruction set plus the whole conversation in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: Vec<String>,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(system_instruction: Vec<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system_instruction,
            messages,
        }
    }

    /// Text of the most recent user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.parts.first())
            .map(String::as_str)
    }
}

/// Incremental text fragments in emission order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn last_user_text_skips_model_messages() {
        let request = CompletionRequest::new(
            vec![],
            vec![
                ChatMessage::user("first"),
                ChatMessage::model("answer"),
                ChatMessage::new(Role::User, vec!["second".into(), "timeRemaining: 10 seconds".into()]),
                ChatMessage::model("another"),
            ],
        );
        assert_eq!(request.last_user_text(), Some("second"));
        assert_eq!(CompletionRequest::default().last_user_text(), None);
    }
}
