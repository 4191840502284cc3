//! Chat session management.

mod manager;

pub use manager::ChatSessionManager;
