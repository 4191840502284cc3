//! Domain layer for Nomad.
//!
//! Models (chat sessions, messages, destinations, favorites, identities), the
//! shared error type, and the traits the other layers implement
//! (`TravelApi`, `IdentityProvider`, `DocumentStore` and the repositories).

pub mod chat;
pub mod config;
pub mod error;
pub mod favorites;
pub mod identity;
pub mod store;
pub mod travel;

// Re-export common error type
pub use error::{NomadError, Result};
