//! Chat domain module.
//!
//! # Module Structure
//!
//! - `model`: chat session entity (`ChatSession`) and title policy
//! - `message`: transcript message types (`MessageRole`, `Message`)
//! - `repository`: persistence interface (`ChatSessionRepository`)
//! - `grouping`: Today / Yesterday / Previous 7 days buckets

mod grouping;
mod message;
mod model;
mod repository;

pub use grouping::{SessionGroups, group_sessions};
pub use message::{Message, MessageRole};
pub use model::{ChatSession, DEFAULT_SESSION_TITLE, TITLE_MAX_CHARS, session_title};
pub use repository::ChatSessionRepository;
