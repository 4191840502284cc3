use std::sync::Arc;

use nomad_core::error::Result;
use nomad_core::favorites::{FavoriteSet, FavoritesRepository};
use nomad_core::identity::Identity;
use nomad_core::travel::Destination;
use tokio::sync::RwLock;

use crate::load_state::LoadState;
use crate::persistence::{PendingWrite, PersistenceWriter};

#[derive(Default)]
struct FavoritesState {
    identity: Option<Identity>,
    favorites: FavoriteSet,
    load_state: LoadState,
    generation: u64,
}

/// Owns the favorite set of the current identity.
///
/// Every change rewrites the whole favorites document for authenticated
/// identities. Guests keep favorites in memory only.
pub struct FavoritesManager {
    state: Arc<RwLock<FavoritesState>>,
    repository: Arc<dyn FavoritesRepository>,
    writer: PersistenceWriter,
}

impl FavoritesManager {
    /// Must be called inside a Tokio runtime.
    pub fn new(repository: Arc<dyn FavoritesRepository>) -> Self {
        Self {
            state: Arc::new(RwLock::new(FavoritesState::default())),
            repository,
            writer: PersistenceWriter::spawn("FavoritesManager"),
        }
    }

    /// Loads the favorites of `identity`. A missing document is an empty set.
    ///
    /// On a read failure the manager is `Loaded` with an empty set and the
    /// error is returned.
    pub async fn load(&self, identity: &Identity) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.identity = Some(identity.clone());
            state.favorites.clear();
            state.load_state = LoadState::Loading;
            state.generation
        };

        let loaded = if identity.persists_data() {
            self.repository.load(identity.uid()).await
        } else {
            Ok(FavoriteSet::new())
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            return Ok(());
        }
        state.load_state = LoadState::Loaded;
        match loaded {
            Ok(favorites) => {
                tracing::debug!(
                    "[FavoritesManager] Loaded {} favorites for {}",
                    favorites.len(),
                    identity.uid()
                );
                state.favorites = favorites;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "[FavoritesManager] Failed to load favorites for {}: {}",
                    identity.uid(),
                    e
                );
                Err(e)
            }
        }
    }

    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let generation = state.generation + 1;
        *state = FavoritesState {
            generation,
            ..FavoritesState::default()
        };
    }

    /// Removes `destination` if it is a favorite, otherwise adds a copy.
    ///
    /// Returns whether it is a favorite afterwards.
    pub async fn toggle(&self, destination: &Destination) -> (bool, PendingWrite) {
        let mut state = self.state.write().await;
        let now_favorite = state.favorites.toggle(destination);
        tracing::debug!(
            "[FavoritesManager] {} {}",
            if now_favorite { "Added" } else { "Removed" },
            destination.id
        );
        let pending = self.persist(&state);
        (now_favorite, pending)
    }

    /// Removes the destination with `id`, persisting even if it was absent.
    pub async fn remove(&self, id: &str) -> PendingWrite {
        let mut state = self.state.write().await;
        state.favorites.remove(id);
        self.persist(&state)
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.state.read().await.favorites.contains(id)
    }

    pub async fn favorites(&self) -> Vec<Destination> {
        self.state.read().await.favorites.as_slice().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.favorites.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.favorites.is_empty()
    }

    pub async fn state(&self) -> LoadState {
        self.state.read().await.load_state
    }

    /// Queues a write of the full set. Called with the state lock held so
    /// snapshots enter the writer in mutation order.
    fn persist(&self, state: &FavoritesState) -> PendingWrite {
        let Some(identity) = state.identity.as_ref().filter(|i| i.persists_data()) else {
            return PendingWrite::skipped();
        };

        let uid = identity.uid().to_string();
        let snapshot = state.favorites.clone();
        let repository = self.repository.clone();
        self.writer
            .submit(format!("{} favorites", snapshot.len()), async move {
                repository.save(&uid, &snapshot).await
            })
    }
}
