//! Profile repository trait.

use async_trait::async_trait;

use super::model::UserProfile;
use crate::error::Result;

/// Persistence for per-user profile documents.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile of `uid`.
    ///
    /// - `Ok(Some(profile))`: profile found
    /// - `Ok(None)`: no profile document yet
    /// - `Err(_)`: read failed or the document is malformed
    async fn find(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Writes the profile document.
    async fn save(&self, profile: &UserProfile) -> Result<()>;
}
