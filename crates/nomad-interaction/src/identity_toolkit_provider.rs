//! IdentityToolkitProvider - REST identity service adapter.
//!
//! Talks to an Identity Toolkit compatible API (`accounts:signInWithPassword`,
//! `accounts:signUp`, `accounts:signInWithIdp`). Each successful call pushes
//! an `IdentityEvent` on the provider's broadcast channel.

use std::time::Duration;

use async_trait::async_trait;
use nomad_core::config::IdentityConfig;
use nomad_core::error::{NomadError, Result};
use nomad_core::identity::{Identity, IdentityEvent, IdentityProvider, OAuthCredential};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{RwLock, broadcast};

use crate::http::{self, build_client};

const EVENT_CAPACITY: usize = 16;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Redirect URI reported for IdP sign-in; the token is posted directly.
const IDP_REQUEST_URI: &str = "http://localhost";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

pub struct IdentityToolkitProvider {
    client: Client,
    base_url: String,
    api_key: String,
    /// ID token of the signed-in account, dropped on sign-out
    id_token: RwLock<Option<String>>,
    events: broadcast::Sender<IdentityEvent>,
}

impl IdentityToolkitProvider {
    /// # Errors
    ///
    /// Returns `NomadError::Config` when no API key is configured.
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| NomadError::config("identity.api_key is required for identity_toolkit"))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            id_token: RwLock::new(None),
            events,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    pub async fn id_token(&self) -> Option<String> {
        self.id_token.read().await.clone()
    }

    async fn call<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> Result<AccountResponse> {
        let response = http::post_json(&self.client, &self.endpoint(method), body)
            .await
            .map_err(|err| NomadError::auth(err.to_string()))?;

        if !response.status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&response.body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", response.status.as_u16()));
            return Err(NomadError::auth(message));
        }

        serde_json::from_str(&response.body)
            .map_err(|err| NomadError::auth(format!("unexpected {method} response: {err}")))
    }

    async fn establish(&self, account: AccountResponse, guest: bool) {
        *self.id_token.write().await = account.id_token;
        let identity = if guest {
            Identity::guest(account.local_id)
        } else {
            Identity::authenticated(account.local_id, account.email)
        };
        let _ = self.events.send(IdentityEvent::SignedIn(identity));
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let account = self.call("signInWithPassword", &request).await?;
        self.establish(account, false).await;
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let account = self.call("signUp", &request).await?;
        self.establish(account, false).await;
        Ok(())
    }

    async fn sign_in_with_oauth(&self, credential: &OAuthCredential) -> Result<()> {
        let request = json!({
            "postBody": format!(
                "id_token={}&providerId={}",
                credential.id_token, credential.provider_id
            ),
            "requestUri": IDP_REQUEST_URI,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        let account = self.call("signInWithIdp", &request).await?;
        self.establish(account, false).await;
        Ok(())
    }

    async fn sign_in_anonymously(&self) -> Result<()> {
        let account = self
            .call("signUp", &json!({ "returnSecureToken": true }))
            .await?;
        self.establish(account, true).await;
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        *self.id_token.write().await = None;
        let _ = self.events.send(IdentityEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub_server;
    use nomad_core::config::IdentityProviderKind;

    fn config(base_url: &str) -> IdentityConfig {
        IdentityConfig {
            provider: IdentityProviderKind::IdentityToolkit,
            base_url: format!("{base_url}/v1"),
            api_key: Some("test-key".to_string()),
        }
    }

    #[test]
    fn test_requires_api_key() {
        let mut config = config("http://127.0.0.1:1");
        config.api_key = None;
        assert!(matches!(
            IdentityToolkitProvider::new(&config),
            Err(NomadError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_password_sign_in_publishes_identity() {
        let (base_url, server) = stub_server::spawn(vec![(
            200,
            r#"{"localId":"u-42","email":"ana@example.com","idToken":"tok"}"#,
        )])
        .await;
        let provider = IdentityToolkitProvider::new(&config(&base_url)).unwrap();
        let mut events = provider.subscribe();

        provider
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            IdentityEvent::SignedIn(Identity::authenticated(
                "u-42",
                Some("ana@example.com".to_string())
            ))
        );
        assert_eq!(provider.id_token().await.as_deref(), Some("tok"));

        let request = server.await.unwrap().remove(0);
        assert_eq!(request.target(), "/v1/accounts:signInWithPassword?key=test-key");
        assert_eq!(request.json()["returnSecureToken"], true);
    }

    #[tokio::test]
    async fn test_anonymous_sign_in_is_guest() {
        let (base_url, server) =
            stub_server::spawn(vec![(200, r#"{"localId":"anon-7","idToken":"tok"}"#)]).await;
        let provider = IdentityToolkitProvider::new(&config(&base_url)).unwrap();
        let mut events = provider.subscribe();

        provider.sign_in_anonymously().await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            IdentityEvent::SignedIn(Identity::guest("anon-7"))
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let (base_url, server) = stub_server::spawn(vec![(
            400,
            r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#,
        )])
        .await;
        let provider = IdentityToolkitProvider::new(&config(&base_url)).unwrap();
        let mut events = provider.subscribe();

        let err = provider
            .sign_in_with_password("ana@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err, NomadError::auth("INVALID_PASSWORD"));
        assert!(events.try_recv().is_err());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_out_is_local() {
        let provider = IdentityToolkitProvider::new(&config("http://127.0.0.1:1")).unwrap();
        let mut events = provider.subscribe();
        provider.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), IdentityEvent::SignedOut);
    }
}
