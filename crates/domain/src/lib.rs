//! Questline domain: the story graph, the session aggregate and summaries.
//!
//! Everything here is pure and synchronous. I/O, locking and external
//! services belong to `questline-engine`.

pub mod error;
pub mod ids;
pub mod session;
pub mod story;
pub mod summary;

pub use error::{ChoiceError, DomainError, StoryLoadError};
pub use ids::{NodeKey, SessionId, UserId};
pub use session::{HistoryEntry, Session, Transition, UndoOutcome};
pub use story::{
    Choice, ChoiceDefinition, ChoiceTarget, NodeDefinition, StoryDefinition, StoryGraph,
    StoryNode, END_SENTINEL,
};
pub use summary::{insight_prompt, render_summary, NO_CHOICES_SUMMARY};
