//! Conversation use-case: one user turn against the search backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nomad_core::chat::{Message, MessageRole};
use nomad_core::error::{NomadError, Result};
use nomad_core::travel::TravelApi;

use crate::session::ChatSessionManager;

/// Assistant text shown when the search backend fails.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error while looking that up. Please try again.";

/// Result of one submitted turn.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub session_id: String,
    /// The assistant message appended for this turn
    pub reply: Message,
    /// The backend failure that was turned into an apology, if any
    pub error: Option<NomadError>,
}

impl SubmitOutcome {
    pub fn is_apology(&self) -> bool {
        self.error.is_some()
    }
}

/// Clears the loading flag on every exit path.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| NomadError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Drives chat turns: user message in, assistant reply (or apology) out.
pub struct ConversationService {
    chat: Arc<ChatSessionManager>,
    api: Arc<dyn TravelApi>,
    loading: AtomicBool,
}

impl ConversationService {
    pub fn new(chat: Arc<ChatSessionManager>, api: Arc<dyn TravelApi>) -> Self {
        Self {
            chat,
            api,
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a turn is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Sends `text` as a user message in the active session (creating one if
    /// needed) and appends the assistant reply.
    ///
    /// Backend failures become an apology message and are reported in
    /// [`SubmitOutcome::error`], never as `Err`.
    ///
    /// # Errors
    ///
    /// - `NomadError::Validation` for blank input
    /// - `NomadError::Busy` while another turn is in flight
    /// - errors from creating the session
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NomadError::validation("message must not be empty"));
        }
        let _loading = LoadingGuard::acquire(&self.loading)?;

        let session_id = match self.chat.active_session_id().await {
            Some(id) => id,
            None => self.chat.create_session().await?,
        };

        // Fire-and-forget; the writer logs failures
        let _ = self
            .chat
            .push_message(&session_id, Message::user(text))
            .await?;

        Ok(self.ask(session_id, text).await)
    }

    /// Drops the trailing assistant messages of the active session and asks
    /// the last user message again.
    pub async fn regenerate(&self) -> Result<SubmitOutcome> {
        let _loading = LoadingGuard::acquire(&self.loading)?;

        let session = self
            .chat
            .active_session()
            .await
            .ok_or_else(|| NomadError::validation("no active session"))?;

        let mut messages = session.messages;
        while messages
            .last()
            .is_some_and(|m| m.role == MessageRole::Assistant)
        {
            messages.pop();
        }
        let query = match messages.last() {
            Some(last) if last.role == MessageRole::User => last.content.clone(),
            _ => return Err(NomadError::validation("nothing to regenerate")),
        };

        let _ = self.chat.append_messages(&session.id, messages).await?;
        Ok(self.ask(session.id, &query).await)
    }

    async fn ask(&self, session_id: String, query: &str) -> SubmitOutcome {
        let (reply, error) = match self.api.search(query, Some(&session_id)).await {
            Ok(reply) => match reply.destinations {
                Some(destinations) if !destinations.is_empty() => {
                    let message = Message::travel_reply(reply.reply, destinations.clone());
                    self.record(&session_id, message.clone()).await;
                    if let Err(e) = self.chat.set_destinations(&session_id, destinations).await {
                        tracing::warn!("[ConversationService] Could not attach destinations: {}", e);
                    }
                    (message, None)
                }
                _ => {
                    let message = Message::assistant(reply.reply);
                    self.record(&session_id, message.clone()).await;
                    (message, None)
                }
            },
            Err(e) => {
                tracing::warn!("[ConversationService] Search failed: {}", e);
                let message = Message::assistant(APOLOGY_MESSAGE);
                self.record(&session_id, message.clone()).await;
                (message, Some(e))
            }
        };

        SubmitOutcome {
            session_id,
            reply,
            error,
        }
    }

    /// Appends a reply. The session may have been deleted meanwhile.
    async fn record(&self, session_id: &str, message: Message) {
        if let Err(e) = self.chat.push_message(session_id, message).await {
            tracing::debug!("[ConversationService] Reply not recorded: {}", e);
        }
    }
}
