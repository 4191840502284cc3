//! Favorites domain module.
//!
//! - `model`: the identity-scoped `FavoriteSet`
//! - `repository`: persistence interface for the favorite set

mod model;
mod repository;

pub use model::FavoriteSet;
pub use repository::FavoritesRepository;
