//! Conversation messages as supplied by the caller.
//!
//! The history is append-only from the caller's point of view and this crate
//! only ever reads it. Entries arriving from a front-end can be incomplete, so
//! both fields default instead of failing deserialization.

use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The staff member answering the consultation.
    User,
    /// The consultation agent.
    #[serde(alias = "ai", alias = "assistant")]
    Agent,
    /// Anything else, including a missing sender.
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationMessage {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub message: String,
}

impl ConversationMessage {
    pub fn new(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
        }
    }

    /// Creates a message from the respondent.
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Sender::User, message)
    }

    /// Creates a message from the agent.
    pub fn agent(message: impl Into<String>) -> Self {
        Self::new(Sender::Agent, message)
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_agent(&self) -> bool {
        self.sender == Sender::Agent
    }
}
