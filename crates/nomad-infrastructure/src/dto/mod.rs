//! Persisted document shapes and their domain conversions.

mod chat_document;
mod favorites_document;
mod profile_document;

pub use chat_document::ChatDocument;
pub use favorites_document::FavoritesDocument;
pub use profile_document::ProfileDocument;
