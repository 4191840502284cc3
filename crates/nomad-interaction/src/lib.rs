//! HTTP adapters for Nomad.
//!
//! - [`NomadApiClient`]: search and itinerary backends (`TravelApi`)
//! - [`IdentityToolkitProvider`]: REST identity service (`IdentityProvider`)

mod http;
pub mod identity_toolkit_provider;
pub mod nomad_api_client;

#[cfg(test)]
mod stub_server;

pub use identity_toolkit_provider::IdentityToolkitProvider;
pub use nomad_api_client::{NomadApiClient, interpret_search_body};
