//! `FavoritesRepository` on top of a `DocumentStore`.

use std::sync::Arc;

use async_trait::async_trait;
use nomad_core::error::Result;
use nomad_core::favorites::{FavoriteSet, FavoritesRepository};
use nomad_core::store::DocumentStore;

use crate::dto::FavoritesDocument;
use crate::layout;

/// The whole favorite set as the single document `users/{uid}/favorites/saved`.
pub struct DocumentFavoritesRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentFavoritesRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FavoritesRepository for DocumentFavoritesRepository {
    async fn load(&self, uid: &str) -> Result<FavoriteSet> {
        match self.store.get(&layout::favorites(uid)).await? {
            Some(value) => {
                let doc: FavoritesDocument = serde_json::from_value(value)?;
                Ok(doc.into_set())
            }
            None => Ok(FavoriteSet::new()),
        }
    }

    async fn save(&self, uid: &str, favorites: &FavoriteSet) -> Result<()> {
        let value = serde_json::to_value(FavoritesDocument::from_set(favorites))?;
        self.store.set(&layout::favorites(uid), value).await
    }
}
