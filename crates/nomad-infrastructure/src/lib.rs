//! Infrastructure layer for Nomad.
//!
//! Document store adapters, the persisted document shapes, repository
//! implementations over any [`DocumentStore`](nomad_core::store::DocumentStore),
//! configuration loading and the local identity provider.

pub mod config_service;
pub mod document_chat_repository;
pub mod document_favorites_repository;
pub mod document_profile_repository;
pub mod dto;
pub mod layout;
pub mod local_identity_provider;
pub mod paths;
pub mod store;

pub use config_service::ConfigService;
pub use document_chat_repository::DocumentChatRepository;
pub use document_favorites_repository::DocumentFavoritesRepository;
pub use document_profile_repository::DocumentProfileRepository;
pub use local_identity_provider::LocalIdentityProvider;
pub use paths::NomadPaths;
pub use store::{JsonDirDocumentStore, MemoryDocumentStore};
