//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate the story graph, the session store and the ports.

pub mod endings;
pub mod session;
pub mod summary;

// Re-export main types
pub use endings::{Coverage, EndingsTracker};
pub use session::SessionUseCases;
pub use summary::NarrativeInsight;
