//! In-process identity provider.
//!
//! Accounts live in memory for the lifetime of the provider. Used for local
//! development without an identity backend, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use nomad_core::error::{NomadError, Result};
use nomad_core::identity::{Identity, IdentityEvent, IdentityProvider, OAuthCredential};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 16;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

pub struct LocalIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    /// OAuth subject (`provider:token`) to uid
    linked: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<IdentityEvent>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Mutex::new(HashMap::new()),
            linked: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn publish(&self, event: IdentityEvent) {
        // No subscriber is not an error
        let _ = self.events.send(event);
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(NomadError::validation("a valid email address is required"));
    }
    Ok(email)
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let email = normalize_email(email)?;
        let uid = {
            let accounts = self.accounts.lock().await;
            match accounts.get(&email) {
                Some(account) if account.password == password => account.uid.clone(),
                _ => return Err(NomadError::auth("invalid email or password")),
            }
        };

        tracing::debug!("Local sign-in for {}", email);
        self.publish(IdentityEvent::SignedIn(Identity::authenticated(uid, Some(email))));
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(NomadError::validation(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        let uid = {
            let mut accounts = self.accounts.lock().await;
            if accounts.contains_key(&email) {
                return Err(NomadError::auth("email already in use"));
            }
            let uid = Uuid::new_v4().to_string();
            accounts.insert(
                email.clone(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            uid
        };

        tracing::debug!("Local account created for {}", email);
        self.publish(IdentityEvent::SignedIn(Identity::authenticated(uid, Some(email))));
        Ok(())
    }

    async fn sign_in_with_oauth(&self, credential: &OAuthCredential) -> Result<()> {
        if credential.id_token.trim().is_empty() {
            return Err(NomadError::auth("missing OAuth id token"));
        }

        let subject = format!("{}:{}", credential.provider_id, credential.id_token);
        let uid = self
            .linked
            .lock()
            .await
            .entry(subject)
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        self.publish(IdentityEvent::SignedIn(Identity::authenticated(uid, None)));
        Ok(())
    }

    async fn sign_in_anonymously(&self) -> Result<()> {
        let uid = Uuid::new_v4().to_string();
        self.publish(IdentityEvent::SignedIn(Identity::guest(uid)));
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.publish(IdentityEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}
