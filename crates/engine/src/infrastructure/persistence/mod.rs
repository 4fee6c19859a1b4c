//! Endings persistence adapters
//!
//! Both adapters implement [`EndingsRepo`](crate::infrastructure::ports::EndingsRepo):
//! - `JsonFileEndingsRepo` - one JSON file per user, survives restarts
//! - `InMemoryEndingsRepo` - process-local, for tests and throwaway runs

mod json_endings;
mod memory_endings;

pub use json_endings::JsonFileEndingsRepo;
pub use memory_endings::InMemoryEndingsRepo;
