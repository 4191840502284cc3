//! `ProfileRepository` on top of a `DocumentStore`.

use std::sync::Arc;

use async_trait::async_trait;
use nomad_core::error::Result;
use nomad_core::identity::{ProfileRepository, UserProfile};
use nomad_core::store::DocumentStore;

use crate::dto::ProfileDocument;
use crate::layout;

pub struct DocumentProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileRepository for DocumentProfileRepository {
    /// A document that cannot be decoded yields a serialization error so the
    /// caller can decide to recreate it.
    async fn find(&self, uid: &str) -> Result<Option<UserProfile>> {
        let Some(value) = self.store.get(&layout::profile(uid)).await? else {
            return Ok(None);
        };
        let doc: ProfileDocument = serde_json::from_value(value)?;
        Ok(Some(doc.into_profile()))
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let value = serde_json::to_value(ProfileDocument::from_profile(profile))?;
        self.store.set(&layout::profile(&profile.uid), value).await
    }
}
