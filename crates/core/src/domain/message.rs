use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role tag carried by every stored message and by every turn sent to the
/// completion service. Serializes lowercase to match both the database CHECK
/// constraint and the chat-completions wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown message role `{0}` (expected user|assistant|system)")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for MessageRole {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// One conversational turn reduced to the shape the completion service
/// accepts. Stored messages are projected into this before being replayed
/// as context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatTurn, MessageRole};

    #[test]
    fn role_round_trips_through_str() {
        for role in [MessageRole::User, MessageRole::Assistant, MessageRole::System] {
            assert_eq!(role.as_str().parse::<MessageRole>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("moderator".parse::<MessageRole>().is_err());
    }

    #[test]
    fn turn_serializes_with_lowercase_role() {
        let turn = ChatTurn::assistant("olá");
        let json = serde_json::to_string(&turn).expect("serialize turn");
        assert_eq!(json, r#"{"role":"assistant","content":"olá"}"#);
    }
}
