use std::sync::Arc;

use nomad_core::identity::{Identity, IdentityEvent};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::state::AuthState;
use crate::favorites::FavoritesManager;
use crate::session::ChatSessionManager;

const SYNC_CAPACITY: usize = 16;

/// Keeps the chat and favorites managers in step with the identity.
///
/// On every identity event both managers are reset to `Unloaded` first, then
/// loaded for the new identity (if any). Once both are loaded the identity is
/// announced on [`IdentityBridge::subscribe`].
pub struct IdentityBridge {
    chat: Arc<ChatSessionManager>,
    favorites: Arc<FavoritesManager>,
    synced: broadcast::Sender<Option<Identity>>,
}

impl IdentityBridge {
    pub fn new(chat: Arc<ChatSessionManager>, favorites: Arc<FavoritesManager>) -> Self {
        let (synced, _) = broadcast::channel(SYNC_CAPACITY);
        Self {
            chat,
            favorites,
            synced,
        }
    }

    /// Follows `auth` until it is dropped.
    pub fn spawn(self: Arc<Self>, auth: &Arc<AuthState>) -> JoinHandle<()> {
        let mut events = auth.subscribe();
        let auth = Arc::downgrade(auth);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.apply(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "[IdentityBridge] Missed {} identity events, resyncing",
                            skipped
                        );
                        let Some(auth) = auth.upgrade() else { break };
                        let event = match auth.current().await {
                            Some(identity) => IdentityEvent::SignedIn(identity),
                            None => IdentityEvent::SignedOut,
                        };
                        self.apply(&event).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Resets both managers, then loads them for the event's identity.
    pub async fn apply(&self, event: &IdentityEvent) {
        self.chat.reset().await;
        self.favorites.reset().await;

        let identity = event.identity().cloned();
        if let Some(identity) = &identity {
            let (chat, favorites) =
                tokio::join!(self.chat.load(identity), self.favorites.load(identity));
            if let Err(e) = chat {
                tracing::warn!("[IdentityBridge] Chat sessions unavailable: {}", e);
            }
            if let Err(e) = favorites {
                tracing::warn!("[IdentityBridge] Favorites unavailable: {}", e);
            }
        }

        tracing::debug!(
            "[IdentityBridge] Synced for {}",
            identity.as_ref().map(Identity::uid).unwrap_or("nobody")
        );
        let _ = self.synced.send(identity);
    }

    /// Identities the managers finished loading for (`None` after sign-out).
    pub fn subscribe(&self) -> broadcast::Receiver<Option<Identity>> {
        self.synced.subscribe()
    }
}
