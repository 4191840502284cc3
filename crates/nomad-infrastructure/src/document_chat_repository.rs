//! `ChatSessionRepository` on top of a `DocumentStore`.

use std::sync::Arc;

use async_trait::async_trait;
use nomad_core::chat::{ChatSession, ChatSessionRepository};
use nomad_core::error::Result;
use nomad_core::store::DocumentStore;
use nomad_core::travel::Destination;
use serde_json::json;

use crate::dto::ChatDocument;
use crate::layout;

/// Chat sessions stored as one document per session under
/// `users/{uid}/chats/{sessionId}`.
pub struct DocumentChatRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentChatRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChatSessionRepository for DocumentChatRepository {
    async fn list_all(&self, uid: &str) -> Result<Vec<ChatSession>> {
        let documents = self.store.list(&layout::chats(uid)).await?;

        let mut sessions = Vec::with_capacity(documents.len());
        for (id, value) in documents {
            match serde_json::from_value::<ChatDocument>(value) {
                Ok(doc) => sessions.push(doc.into_session(id)),
                Err(e) => {
                    tracing::warn!("Skipping malformed chat document {}/{}: {}", uid, id, e);
                }
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn save(&self, uid: &str, session: &ChatSession) -> Result<()> {
        let value = serde_json::to_value(ChatDocument::from_session(session))?;
        self.store
            .set(&layout::chat(uid, &session.id), value)
            .await
    }

    async fn save_destinations(
        &self,
        uid: &str,
        session_id: &str,
        destinations: &[Destination],
    ) -> Result<()> {
        self.store
            .merge(
                &layout::chat(uid, session_id),
                json!({ "destinations": destinations }),
            )
            .await
    }

    async fn delete(&self, uid: &str, session_id: &str) -> Result<()> {
        self.store.delete(&layout::chat(uid, session_id)).await
    }
}
