//! Chat model trait and message types.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend.
///
/// Implementations make exactly one upstream call per `complete` and surface
/// any failure as [`crate::error::Error::Upstream`].
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent upstream
    fn model_id(&self) -> &str;

    /// Send `messages` and return the first choice's text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Shared handle used by triage and the responder
pub type SharedChatModel = Arc<dyn ChatModel>;
