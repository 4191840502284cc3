//! Document store adapters.

mod json_dir;
mod memory;

pub use json_dir::JsonDirDocumentStore;
pub use memory::MemoryDocumentStore;
