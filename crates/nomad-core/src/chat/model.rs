//! Chat session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;
use crate::travel::Destination;

/// Title given to a session before it holds any message.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Number of leading characters of the first message used as the title.
pub const TITLE_MAX_CHARS: usize = 30;

/// One conversation thread with its history and last recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Client-generated unique identifier (UUID format)
    pub id: String,
    /// Derived from the first message, see [`session_title`]
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    /// Last destination list, recoverable even if message fields are stripped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<Destination>>,
    /// Preview of the final message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl ChatSession {
    /// Creates an empty session with a fresh id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string(), Utc::now())
    }

    pub fn with_id(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            created_at,
            messages: Vec::new(),
            destinations: None,
            last_message: None,
        }
    }

    /// Replaces the transcript and recomputes title and preview.
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.title = session_title(&messages);
        self.last_message = messages.last().map(|m| m.content.clone());
        self.messages = messages;
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Title for a transcript: the first `TITLE_MAX_CHARS` characters of the
/// first message, or [`DEFAULT_SESSION_TITLE`] for an empty transcript.
pub fn session_title(messages: &[Message]) -> String {
    match messages.first() {
        Some(first) => first.content.chars().take(TITLE_MAX_CHARS).collect(),
        None => DEFAULT_SESSION_TITLE.to_string(),
    }
}
