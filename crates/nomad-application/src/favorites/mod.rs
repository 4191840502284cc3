//! Favorite destinations.

mod manager;

pub use manager::FavoritesManager;
