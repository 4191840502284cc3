use std::sync::Arc;
use std::time::Duration;

use nomad_core::error::{NomadError, Result};
use nomad_core::identity::{
    Identity, IdentityEvent, IdentityProvider, OAuthCredential, ProfileRepository, UserProfile,
};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 16;
/// How long `login_as_guest` waits for the provider to report the guest.
const GUEST_EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracks the current identity and exposes login operations.
///
/// Login calls only ask the provider for a change. The current identity is
/// updated when the provider pushes an [`IdentityEvent`], which is then
/// republished to [`AuthState::subscribe`] subscribers. For authenticated
/// identities the profile document is created (or recreated if unreadable)
/// before the event is republished.
pub struct AuthState {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
    current: Arc<RwLock<Option<Identity>>>,
    events: broadcast::Sender<IdentityEvent>,
    listener: JoinHandle<()>,
}

impl AuthState {
    /// Subscribes to `provider` and starts tracking its events. Must be
    /// called inside a Tokio runtime.
    pub fn new(provider: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        let current = Arc::new(RwLock::new(None));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let listener = tokio::spawn(listen(
            provider.subscribe(),
            current.clone(),
            profiles.clone(),
            events.clone(),
        ));

        Self {
            provider,
            profiles,
            current,
            events,
            listener,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        check_credentials(email, password)?;
        self.provider.sign_in_with_password(email, password).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<()> {
        check_credentials(email, password)?;
        self.provider.sign_up(email, password).await
    }

    /// Signs in with an ID token obtained from an external OAuth flow.
    pub async fn login_with_oauth_provider(&self, provider_id: &str, id_token: &str) -> Result<()> {
        let credential = OAuthCredential {
            provider_id: provider_id.to_string(),
            id_token: id_token.to_string(),
        };
        self.provider.sign_in_with_oauth(&credential).await
    }

    /// Starts a guest identity and writes its profile marker.
    ///
    /// Returns once the guest identity is established. A failed marker write
    /// is logged, not returned.
    pub async fn login_as_guest(&self) -> Result<()> {
        let mut events = self.events.subscribe();
        self.provider.sign_in_anonymously().await?;

        let guest = tokio::time::timeout(GUEST_EVENT_TIMEOUT, async {
            loop {
                match events.recv().await {
                    Ok(IdentityEvent::SignedIn(identity)) if identity.is_guest() => {
                        return Ok(identity);
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(NomadError::internal("identity events closed"));
                    }
                }
            }
        })
        .await
        .map_err(|_| NomadError::auth("guest sign-in was not confirmed"))??;

        let marker = UserProfile::for_identity(&guest);
        if let Err(e) = self.profiles.save(&marker).await {
            tracing::warn!("[AuthState] Failed to write guest marker for {}: {}", guest.uid(), e);
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.provider.sign_out().await
    }

    /// Identity changes, delivered after `current()` reflects them.
    pub fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }
}

impl Drop for AuthState {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn check_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(NomadError::validation("email must not be empty"));
    }
    if password.is_empty() {
        return Err(NomadError::validation("password must not be empty"));
    }
    Ok(())
}

async fn listen(
    mut provider_events: broadcast::Receiver<IdentityEvent>,
    current: Arc<RwLock<Option<Identity>>>,
    profiles: Arc<dyn ProfileRepository>,
    events: broadcast::Sender<IdentityEvent>,
) {
    loop {
        let event = match provider_events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("[AuthState] Missed {} identity events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match &event {
            IdentityEvent::SignedIn(identity) => {
                tracing::info!(
                    "Signed in as {} ({})",
                    identity.display_name(),
                    if identity.is_guest() { "guest" } else { "account" }
                );
                if identity.persists_data() {
                    ensure_profile(profiles.as_ref(), identity).await;
                }
            }
            IdentityEvent::SignedOut => tracing::info!("Signed out"),
        }

        *current.write().await = event.identity().cloned();
        // No subscriber is fine
        let _ = events.send(event);
    }
}

/// Creates the profile document when it is missing or cannot be decoded.
async fn ensure_profile(profiles: &dyn ProfileRepository, identity: &Identity) {
    match profiles.find(identity.uid()).await {
        Ok(Some(_)) => return,
        Ok(None) => tracing::debug!("[AuthState] Creating profile for {}", identity.uid()),
        Err(e) if e.is_serialization() => {
            tracing::warn!("[AuthState] Recreating malformed profile of {}: {}", identity.uid(), e);
        }
        Err(e) => {
            tracing::warn!("[AuthState] Failed to read profile of {}: {}", identity.uid(), e);
            return;
        }
    }

    if let Err(e) = profiles.save(&UserProfile::for_identity(identity)).await {
        tracing::warn!("[AuthState] Failed to write profile of {}: {}", identity.uid(), e);
    }
}
