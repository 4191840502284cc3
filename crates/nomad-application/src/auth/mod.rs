//! Identity tracking and its wiring into the data managers.

mod bridge;
mod state;

pub use bridge::IdentityBridge;
pub use state::AuthState;
