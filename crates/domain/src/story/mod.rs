//! Story graph - immutable narrative content
//!
//! A story is a directed graph of nodes. Each node carries display text, an
//! optional image reference and an ordered list of choices; a choice leads to
//! another node or to the terminal sentinel.
//!
//! The graph is built once from a [`StoryDefinition`] and never mutated, so it
//! can be shared across sessions behind an `Arc` without locking.

mod definition;
mod graph;
mod node;

pub use definition::{ChoiceDefinition, NodeDefinition, StoryDefinition, END_SENTINEL};
pub use graph::StoryGraph;
pub use node::{Choice, ChoiceTarget, StoryNode};
