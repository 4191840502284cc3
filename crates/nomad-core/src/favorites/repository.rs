//! Favorites repository trait.

use async_trait::async_trait;

use super::model::FavoriteSet;
use crate::error::Result;

/// Persistence for the favorite set of one user.
///
/// The whole set is stored as a single document and rewritten on every save.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Loads the favorite set. A missing document yields an empty set.
    async fn load(&self, uid: &str) -> Result<FavoriteSet>;

    /// Replaces the stored favorite set.
    async fn save(&self, uid: &str, favorites: &FavoriteSet) -> Result<()>;
}
