//! Identity provider trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::model::{IdentityEvent, OAuthCredential};
use crate::error::Result;

/// An external identity provider.
///
/// Operations only *request* a state change. The authoritative signal is the
/// `IdentityEvent` stream from [`IdentityProvider::subscribe`]; callers must
/// not derive the current identity from a call's return value.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in an existing account with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()>;

    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    /// Signs in with a credential from an external OAuth flow.
    async fn sign_in_with_oauth(&self, credential: &OAuthCredential) -> Result<()>;

    /// Starts an anonymous (guest) identity.
    async fn sign_in_anonymously(&self) -> Result<()>;

    /// Ends the current identity.
    async fn sign_out(&self) -> Result<()>;

    /// Subscribes to identity state changes.
    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent>;
}
