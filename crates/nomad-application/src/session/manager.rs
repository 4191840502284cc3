use std::sync::Arc;

use nomad_core::chat::{ChatSession, ChatSessionRepository, Message, MessageRole};
use nomad_core::error::{NomadError, Result};
use nomad_core::identity::Identity;
use nomad_core::travel::Destination;
use tokio::sync::RwLock;

use crate::load_state::LoadState;
use crate::persistence::{PendingWrite, PersistenceWriter};

#[derive(Default)]
struct ChatState {
    identity: Option<Identity>,
    /// Most recently created first
    sessions: Vec<ChatSession>,
    active_session_id: Option<String>,
    load_state: LoadState,
    /// Bumped on every load/reset so a stale load cannot overwrite newer state
    generation: u64,
}

impl ChatState {
    /// The uid to persist under, if the current identity persists data.
    fn persisting_uid(&self) -> Option<String> {
        self.identity
            .as_ref()
            .filter(|identity| identity.persists_data())
            .map(|identity| identity.uid().to_string())
    }

    fn session_mut(&mut self, session_id: &str) -> Result<&mut ChatSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| NomadError::not_found("ChatSession", session_id))
    }
}

/// Owns the in-memory chat session list of the current identity.
///
/// `ChatSessionManager` is responsible for:
/// - Loading a user's sessions when the identity changes
/// - Creating, selecting, renaming and deleting sessions
/// - Replacing transcripts and destination lists
/// - Mirroring every mutation to the store for authenticated identities
///
/// Mutations apply to memory first. Persistence jobs are queued on a FIFO
/// writer while the state lock is held, so the store sees them in mutation
/// order. Each one is reported through the returned [`PendingWrite`]. Guests
/// never write.
pub struct ChatSessionManager {
    state: Arc<RwLock<ChatState>>,
    repository: Arc<dyn ChatSessionRepository>,
    writer: PersistenceWriter,
}

impl ChatSessionManager {
    /// Creates a manager in the `Unloaded` state. Must be called inside a
    /// Tokio runtime.
    pub fn new(repository: Arc<dyn ChatSessionRepository>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChatState::default())),
            repository,
            writer: PersistenceWriter::spawn("ChatSessionManager"),
        }
    }

    /// Loads the sessions of `identity` and makes the most recent one active.
    ///
    /// Guests start with an empty list. If the store cannot be read the
    /// manager still ends up `Loaded` (empty) and the error is returned.
    pub async fn load(&self, identity: &Identity) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.identity = Some(identity.clone());
            state.sessions.clear();
            state.active_session_id = None;
            state.load_state = LoadState::Loading;
            state.generation
        };
        tracing::debug!("[ChatSessionManager] Loading sessions for {}", identity.uid());

        let loaded = if identity.persists_data() {
            self.repository.list_all(identity.uid()).await
        } else {
            Ok(Vec::new())
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!("[ChatSessionManager] Discarding stale load for {}", identity.uid());
            return Ok(());
        }

        let result = match loaded {
            Ok(mut sessions) => {
                sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                state.sessions = sessions;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "[ChatSessionManager] Failed to load sessions for {}: {}",
                    identity.uid(),
                    e
                );
                Err(e)
            }
        };
        state.active_session_id = state.sessions.first().map(|s| s.id.clone());
        state.load_state = LoadState::Loaded;
        tracing::debug!(
            "[ChatSessionManager] Loaded {} sessions, active={:?}",
            state.sessions.len(),
            state.active_session_id
        );
        result
    }

    /// Drops all in-memory state.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let generation = state.generation + 1;
        *state = ChatState {
            generation,
            ..ChatState::default()
        };
        tracing::debug!("[ChatSessionManager] Reset");
    }

    /// Creates an empty session, prepends it and makes it active.
    ///
    /// For authenticated identities the initial document is written before
    /// returning. If that write fails the session is removed again, the active
    /// pointer falls back to the next most recent session, and the error is
    /// returned.
    pub async fn create_session(&self) -> Result<String> {
        let session = ChatSession::new();
        let session_id = session.id.clone();

        let pending = {
            let mut state = self.state.write().await;
            state.sessions.insert(0, session.clone());
            state.active_session_id = Some(session_id.clone());
            match state.persisting_uid() {
                Some(uid) => self.persist_session(uid, session),
                None => PendingWrite::skipped(),
            }
        };
        tracing::debug!("[ChatSessionManager] Created session {}", session_id);

        if let Err(e) = pending.wait().await {
            let mut state = self.state.write().await;
            state.sessions.retain(|s| s.id != session_id);
            if state.active_session_id.as_deref() == Some(session_id.as_str()) {
                state.active_session_id = state.sessions.first().map(|s| s.id.clone());
            }
            tracing::warn!(
                "[ChatSessionManager] Rolled back session {}: {}",
                session_id,
                e
            );
            return Err(e);
        }

        Ok(session_id)
    }

    /// Makes `session_id` active. `None` starts a new session; an unknown id
    /// is ignored.
    pub async fn select_session(&self, session_id: Option<&str>) -> Result<()> {
        let Some(session_id) = session_id else {
            self.create_session().await?;
            return Ok(());
        };

        let mut state = self.state.write().await;
        if state.sessions.iter().any(|s| s.id == session_id) {
            state.active_session_id = Some(session_id.to_string());
        } else {
            tracing::debug!("[ChatSessionManager] Ignoring unknown session {}", session_id);
        }
        Ok(())
    }

    /// Replaces the transcript of a session.
    ///
    /// Recomputes title and preview, and strips recommendation fields from
    /// non-assistant messages.
    pub async fn append_messages(
        &self,
        session_id: &str,
        messages: Vec<Message>,
    ) -> Result<PendingWrite> {
        self.update_transcript(session_id, |_| messages).await
    }

    /// Appends one message to the current transcript of a session.
    pub async fn push_message(&self, session_id: &str, message: Message) -> Result<PendingWrite> {
        self.update_transcript(session_id, |current| {
            let mut messages = current.to_vec();
            messages.push(message);
            messages
        })
        .await
    }

    async fn update_transcript<F>(&self, session_id: &str, build: F) -> Result<PendingWrite>
    where
        F: FnOnce(&[Message]) -> Vec<Message>,
    {
        let mut state = self.state.write().await;
        let uid = state.persisting_uid();
        let session = state.session_mut(session_id)?;

        let mut messages = build(&session.messages);
        for message in &mut messages {
            if message.strip_travel_fields() {
                tracing::warn!(
                    "[ChatSessionManager] Stripped recommendation fields from {} message {}",
                    role_label(message.role),
                    message.id
                );
            }
        }
        session.replace_messages(messages);

        Ok(match uid {
            Some(uid) => self.persist_session(uid, session.clone()),
            None => PendingWrite::skipped(),
        })
    }

    /// Attaches a destination list to a session without touching messages.
    pub async fn set_destinations(
        &self,
        session_id: &str,
        destinations: Vec<Destination>,
    ) -> Result<PendingWrite> {
        let mut state = self.state.write().await;
        let uid = state.persisting_uid();
        state.session_mut(session_id)?.destinations = Some(destinations.clone());

        let Some(uid) = uid else {
            return Ok(PendingWrite::skipped());
        };
        let repository = self.repository.clone();
        let session_id = session_id.to_string();
        Ok(self.writer.submit(
            format!("destinations of {session_id}"),
            async move {
                repository
                    .save_destinations(&uid, &session_id, &destinations)
                    .await
            },
        ))
    }

    pub async fn rename_session(&self, session_id: &str, title: &str) -> Result<PendingWrite> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NomadError::validation("title must not be empty"));
        }

        let mut state = self.state.write().await;
        let uid = state.persisting_uid();
        let session = state.session_mut(session_id)?;
        session.title = title.to_string();

        Ok(match uid {
            Some(uid) => self.persist_session(uid, session.clone()),
            None => PendingWrite::skipped(),
        })
    }

    /// Removes a session. Clears the active pointer if it pointed at it.
    /// Unknown ids are a no-op.
    pub async fn delete_session(&self, session_id: &str) -> PendingWrite {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != session_id);
        if state.sessions.len() == before {
            tracing::debug!("[ChatSessionManager] Nothing to delete for {}", session_id);
            return PendingWrite::skipped();
        }
        if state.active_session_id.as_deref() == Some(session_id) {
            state.active_session_id = None;
        }

        let Some(uid) = state.persisting_uid() else {
            return PendingWrite::skipped();
        };
        let repository = self.repository.clone();
        let session_id = session_id.to_string();
        self.writer
            .submit(format!("deletion of {session_id}"), async move {
                repository.delete(&uid, &session_id).await
            })
    }

    fn persist_session(&self, uid: String, session: ChatSession) -> PendingWrite {
        let repository = self.repository.clone();
        self.writer
            .submit(format!("session {}", session.id), async move {
                repository.save(&uid, &session).await
            })
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub async fn sessions(&self) -> Vec<ChatSession> {
        self.state.read().await.sessions.clone()
    }

    pub async fn session(&self, session_id: &str) -> Option<ChatSession> {
        let state = self.state.read().await;
        state.sessions.iter().find(|s| s.id == session_id).cloned()
    }

    pub async fn active_session_id(&self) -> Option<String> {
        self.state.read().await.active_session_id.clone()
    }

    pub async fn active_session(&self) -> Option<ChatSession> {
        let state = self.state.read().await;
        let id = state.active_session_id.as_deref()?;
        state.sessions.iter().find(|s| s.id == id).cloned()
    }

    pub async fn state(&self) -> LoadState {
        self.state.read().await.load_state
    }

    /// Identity the current data belongs to.
    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use nomad_core::travel::CostOfLiving;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory repository that records every write.
    #[derive(Default)]
    struct MockRepository {
        docs: Mutex<HashMap<(String, String), ChatSession>>,
        writes: Mutex<Vec<String>>,
        fail_writes: AtomicBool,
    }

    impl MockRepository {
        fn with_sessions(uid: &str, sessions: Vec<ChatSession>) -> Self {
            let repo = Self::default();
            for session in sessions {
                repo.docs
                    .lock()
                    .unwrap()
                    .insert((uid.to_string(), session.id.clone()), session);
            }
            repo
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        fn record(&self, op: String) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(NomadError::data_access("store offline"));
            }
            self.writes.lock().unwrap().push(op);
            Ok(())
        }
    }

    #[async_trait]
    impl ChatSessionRepository for MockRepository {
        async fn list_all(&self, uid: &str) -> Result<Vec<ChatSession>> {
            let docs = self.docs.lock().unwrap();
            Ok(docs
                .iter()
                .filter(|((owner, _), _)| owner == uid)
                .map(|(_, s)| s.clone())
                .collect())
        }

        async fn save(&self, uid: &str, session: &ChatSession) -> Result<()> {
            self.record(format!("save {}", session.id))?;
            self.docs
                .lock()
                .unwrap()
                .insert((uid.to_string(), session.id.clone()), session.clone());
            Ok(())
        }

        async fn save_destinations(
            &self,
            uid: &str,
            session_id: &str,
            destinations: &[Destination],
        ) -> Result<()> {
            self.record(format!("destinations {session_id}"))?;
            if let Some(doc) = self
                .docs
                .lock()
                .unwrap()
                .get_mut(&(uid.to_string(), session_id.to_string()))
            {
                doc.destinations = Some(destinations.to_vec());
            }
            Ok(())
        }

        async fn delete(&self, uid: &str, session_id: &str) -> Result<()> {
            self.record(format!("delete {session_id}"))?;
            self.docs
                .lock()
                .unwrap()
                .remove(&(uid.to_string(), session_id.to_string()));
            Ok(())
        }
    }

    fn user() -> Identity {
        Identity::authenticated("u1", Some("ana@example.com".to_string()))
    }

    async fn loaded_manager(repo: Arc<MockRepository>, identity: &Identity) -> ChatSessionManager {
        let manager = ChatSessionManager::new(repo);
        manager.load(identity).await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_load_sorts_newest_first_and_activates_it() {
        let now = Utc::now();
        let repo = Arc::new(MockRepository::with_sessions(
            "u1",
            vec![
                ChatSession::with_id("old", now - Duration::days(3)),
                ChatSession::with_id("new", now),
                ChatSession::with_id("mid", now - Duration::hours(5)),
            ],
        ));
        let manager = ChatSessionManager::new(repo);
        assert_eq!(manager.state().await, LoadState::Unloaded);

        manager.load(&user()).await.unwrap();

        let ids: Vec<_> = manager.sessions().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(manager.active_session_id().await.as_deref(), Some("new"));
        assert_eq!(manager.state().await, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_guest_create_session_writes_nothing() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &Identity::guest("anon")).await;

        let id = manager.create_session().await.unwrap();
        manager
            .append_messages(&id, vec![Message::user("hi")])
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(manager.active_session_id().await, Some(id));
        assert!(repo.writes().is_empty());
    }

    #[tokio::test]
    async fn test_create_session_persists_and_prepends() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;

        let first = manager.create_session().await.unwrap();
        let second = manager.create_session().await.unwrap();

        let sessions = manager.sessions().await;
        assert_eq!(sessions[0].id, second);
        assert_eq!(sessions[1].id, first);
        assert_eq!(sessions[0].title, "New Chat");
        assert_eq!(
            repo.writes(),
            vec![format!("save {first}"), format!("save {second}")]
        );
    }

    #[tokio::test]
    async fn test_create_session_rolls_back_on_write_failure() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let kept = manager.create_session().await.unwrap();

        repo.fail_writes.store(true, Ordering::SeqCst);
        let err = manager.create_session().await.unwrap_err();

        assert_eq!(err, NomadError::data_access("store offline"));
        assert_eq!(manager.sessions().await.len(), 1);
        assert_eq!(manager.active_session_id().await, Some(kept));
    }

    #[tokio::test]
    async fn test_append_messages_sets_title_and_preview() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let id = manager.create_session().await.unwrap();

        manager
            .append_messages(
                &id,
                vec![
                    Message::user("Where should I spend the winter months working remotely?"),
                    Message::assistant("Consider Lisbon."),
                ],
            )
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let session = manager.session(&id).await.unwrap();
        assert_eq!(session.title, "Where should I spend the winte");
        assert_eq!(session.last_message.as_deref(), Some("Consider Lisbon."));

        let stored = repo.list_all("u1").await.unwrap().remove(0);
        assert_eq!(stored.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_append_strips_travel_fields_from_user_messages() {
        let manager = loaded_manager(Arc::new(MockRepository::default()), &user()).await;
        let id = manager.create_session().await.unwrap();

        let mut forged = Message::user("Thailand");
        forged.is_travel = Some(true);
        forged.destinations = Some(vec![]);
        let _ = manager.append_messages(&id, vec![forged]).await.unwrap();

        let session = manager.session(&id).await.unwrap();
        assert!(session.messages[0].is_travel.is_none());
        assert!(session.messages[0].destinations.is_none());
    }

    #[tokio::test]
    async fn test_append_unknown_session_is_not_found() {
        let manager = loaded_manager(Arc::new(MockRepository::default()), &user()).await;
        let err = manager
            .append_messages("missing", vec![Message::user("hi")])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_set_destinations_is_a_separate_write() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let id = manager.create_session().await.unwrap();
        let bali = Destination::new("4", "Ubud", "Indonesia", CostOfLiving::Low);

        manager
            .set_destinations(&id, vec![bali.clone()])
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(
            manager.session(&id).await.unwrap().destinations,
            Some(vec![bali])
        );
        assert_eq!(repo.writes().last().unwrap(), &format!("destinations {id}"));
    }

    #[tokio::test]
    async fn test_writes_land_in_issue_order() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let id = manager.create_session().await.unwrap();

        let _ = manager
            .append_messages(&id, vec![Message::user("first")])
            .await
            .unwrap();
        manager
            .append_messages(&id, vec![Message::user("second")])
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let stored = repo.list_all("u1").await.unwrap().remove(0);
        assert_eq!(stored.title, "second");
    }

    #[tokio::test]
    async fn test_select_session() {
        let manager = loaded_manager(Arc::new(MockRepository::default()), &user()).await;
        let first = manager.create_session().await.unwrap();
        let second = manager.create_session().await.unwrap();

        manager.select_session(Some(&first)).await.unwrap();
        assert_eq!(manager.active_session_id().await, Some(first.clone()));

        manager.select_session(Some("nope")).await.unwrap();
        assert_eq!(manager.active_session_id().await, Some(first));

        manager.select_session(None).await.unwrap();
        let active = manager.active_session_id().await.unwrap();
        assert_ne!(active, second);
        assert_eq!(manager.sessions().await.len(), 3);
    }

    #[tokio::test]
    async fn test_rename_session() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let id = manager.create_session().await.unwrap();

        assert!(manager.rename_session(&id, "   ").await.is_err());
        manager
            .rename_session(&id, " Lisbon ideas ")
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(manager.session(&id).await.unwrap().title, "Lisbon ideas");
        assert_eq!(repo.list_all("u1").await.unwrap()[0].title, "Lisbon ideas");
    }

    #[tokio::test]
    async fn test_delete_active_session_clears_pointer() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let other = manager.create_session().await.unwrap();
        let active = manager.create_session().await.unwrap();

        manager.delete_session(&active).await.wait().await.unwrap();

        assert!(manager.active_session_id().await.is_none());
        assert!(manager.session(&active).await.is_none());
        assert!(manager.session(&other).await.is_some());
        assert_eq!(repo.writes().last().unwrap(), &format!("delete {active}"));

        // Deleting a non-active session keeps the pointer
        manager.select_session(Some(&other)).await.unwrap();
        let third = manager.create_session().await.unwrap();
        manager.select_session(Some(&other)).await.unwrap();
        let _ = manager.delete_session(&third).await;
        assert_eq!(manager.active_session_id().await, Some(other));

        assert!(manager.delete_session("missing").await.is_skipped());
    }

    #[tokio::test]
    async fn test_failed_fire_and_forget_write_keeps_memory_state() {
        let repo = Arc::new(MockRepository::default());
        let manager = loaded_manager(repo.clone(), &user()).await;
        let id = manager.create_session().await.unwrap();

        repo.fail_writes.store(true, Ordering::SeqCst);
        let pending = manager
            .append_messages(&id, vec![Message::user("kept locally")])
            .await
            .unwrap();
        assert!(pending.wait().await.is_err());

        let session = manager.session(&id).await.unwrap();
        assert_eq!(session.title, "kept locally");
    }

    #[tokio::test]
    async fn test_reset_returns_to_unloaded() {
        let manager = loaded_manager(Arc::new(MockRepository::default()), &user()).await;
        manager.create_session().await.unwrap();

        manager.reset().await;

        assert_eq!(manager.state().await, LoadState::Unloaded);
        assert!(manager.sessions().await.is_empty());
        assert!(manager.active_session_id().await.is_none());
        assert!(manager.identity().await.is_none());
    }

    #[tokio::test]
    async fn test_guest_load_starts_empty() {
        let now = Utc::now();
        let repo = Arc::new(MockRepository::with_sessions(
            "anon",
            vec![ChatSession::with_id("leftover", now)],
        ));
        let manager = loaded_manager(repo, &Identity::guest("anon")).await;
        assert!(manager.sessions().await.is_empty());
        assert_eq!(manager.state().await, LoadState::Loaded);
    }
}
