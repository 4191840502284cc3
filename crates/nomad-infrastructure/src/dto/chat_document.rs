//! Chat session document: `users/{uid}/chats/{sessionId}`.

use chrono::{DateTime, TimeZone, Utc};
use nomad_core::chat::{ChatSession, DEFAULT_SESSION_TITLE, Message};
use nomad_core::travel::Destination;
use serde::{Deserialize, Deserializer, Serialize};

/// Stored form of a [`ChatSession`]. The session id is the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDocument {
    #[serde(default = "default_title")]
    pub title: String,
    /// Creation time. Older documents may carry epoch milliseconds.
    #[serde(deserialize_with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub destinations: Vec<Destination>,
}

fn default_title() -> String {
    DEFAULT_SESSION_TITLE.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(DateTime<Utc>),
    Millis(i64),
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(at) => Ok(at),
        RawTimestamp::Millis(millis) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {millis}"))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Destination>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Destination>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatDocument {
    pub fn from_session(session: &ChatSession) -> Self {
        Self {
            title: session.title.clone(),
            timestamp: session.created_at,
            messages: session.messages.clone(),
            last_message: session.last_message.clone(),
            destinations: session.destinations.clone().unwrap_or_default(),
        }
    }

    pub fn into_session(self, id: impl Into<String>) -> ChatSession {
        let mut session = ChatSession::with_id(id, self.timestamp);
        session.title = self.title;
        session.messages = self.messages;
        session.last_message = self.last_message;
        session.destinations = (!self.destinations.is_empty()).then_some(self.destinations);
        session
    }
}
