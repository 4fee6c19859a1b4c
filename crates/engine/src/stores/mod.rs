//! In-memory state storage modules.
//!
//! Stores manage runtime state that is never persisted:
//! - `SessionStore` - live play-through per user

pub mod session;

pub use session::SessionStore;
