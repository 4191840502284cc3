//! Chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::travel::Destination;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// System-generated message.
    System,
}

/// A single message in a chat transcript.
///
/// Only assistant messages may carry `is_travel` or `destinations`; use
/// [`Message::travel_reply`] to build a recommendation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_travel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<Destination>>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
            is_travel: None,
            destinations: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// Assistant message carrying destination recommendations.
    pub fn travel_reply(content: impl Into<String>, destinations: Vec<Destination>) -> Self {
        Self {
            is_travel: Some(true),
            destinations: Some(destinations),
            ..Self::assistant(content)
        }
    }

    pub fn is_travel(&self) -> bool {
        self.is_travel.unwrap_or(false)
    }

    /// Drops travel fields from non-assistant messages.
    ///
    /// Returns `true` if anything was removed.
    pub fn strip_travel_fields(&mut self) -> bool {
        if self.role == MessageRole::Assistant {
            return false;
        }
        let had_fields = self.is_travel.is_some() || self.destinations.is_some();
        self.is_travel = None;
        self.destinations = None;
        had_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::CostOfLiving;

    #[test]
    fn test_travel_reply_is_assistant() {
        let dest = Destination::new("1", "Chiang Mai", "Thailand", CostOfLiving::Low);
        let msg = Message::travel_reply("Here are some picks", vec![dest]);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.is_travel());
        assert_eq!(msg.destinations.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_strip_travel_fields_only_touches_non_assistant() {
        let dest = Destination::new("1", "Chiang Mai", "Thailand", CostOfLiving::Low);

        let mut assistant = Message::travel_reply("picks", vec![dest.clone()]);
        assert!(!assistant.strip_travel_fields());
        assert!(assistant.is_travel());

        let mut user = Message::user("Thailand");
        user.is_travel = Some(true);
        user.destinations = Some(vec![dest]);
        assert!(user.strip_travel_fields());
        assert!(user.is_travel.is_none());
        assert!(user.destinations.is_none());
    }

    #[test]
    fn test_message_ids_are_unique() {
        assert_ne!(Message::user("a").id, Message::user("a").id);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("isTravel"));
    }
}
