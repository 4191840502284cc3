//! Chat session repository trait.
//!
//! Defines the interface for chat session persistence operations.

use async_trait::async_trait;

use super::model::ChatSession;
use crate::error::Result;
use crate::travel::Destination;

/// An abstract repository for one user's chat session documents.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Skip (and log) documents that fail to decode in `list_all`
/// - Treat deletion of a missing session as success
#[async_trait]
pub trait ChatSessionRepository: Send + Sync {
    /// Lists all stored sessions of `uid`, most recently created first.
    async fn list_all(&self, uid: &str) -> Result<Vec<ChatSession>>;

    /// Writes the full session document (messages and metadata).
    async fn save(&self, uid: &str, session: &ChatSession) -> Result<()>;

    /// Writes only the destination list of a session.
    async fn save_destinations(
        &self,
        uid: &str,
        session_id: &str,
        destinations: &[Destination],
    ) -> Result<()>;

    /// Deletes a session document.
    async fn delete(&self, uid: &str, session_id: &str) -> Result<()>;
}
