//! Identity domain module.
//!
//! - `model`: `Identity`, `IdentityEvent`, `OAuthCredential`, `UserProfile`
//! - `repository`: `ProfileRepository` for profile documents
//! - `provider`: the `IdentityProvider` trait implemented by infrastructure

mod model;
mod provider;
mod repository;

pub use model::{Identity, IdentityEvent, OAuthCredential, UserProfile};
pub use provider::IdentityProvider;
pub use repository::ProfileRepository;
