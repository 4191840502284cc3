//! Application layer for Nomad.
//!
//! Use cases coordinating the domain and infrastructure layers: chat session
//! and favorites state per identity, the authentication flow, conversation
//! turns against the search backend, and trip planning.

pub mod auth;
pub mod conversation;
pub mod favorites;
pub mod load_state;
pub mod persistence;
pub mod session;
pub mod trip_planner;

pub use auth::{AuthState, IdentityBridge};
pub use conversation::{APOLOGY_MESSAGE, ConversationService, SubmitOutcome};
pub use favorites::FavoritesManager;
pub use load_state::LoadState;
pub use persistence::{PendingWrite, PersistenceWriter};
pub use session::ChatSessionManager;
pub use trip_planner::{PlanSource, TripPlan, TripPlanner};
