//! Session aggregate - one user's traversal of the story graph
//!
//! The aggregate owns the current node and the choice history and enforces
//! the transition rules. It is pure: persistence, locking and ending handling
//! live in the engine.
//!
//! # Transitions
//!
//! - `choose` validates against the current node before touching any state,
//!   so a failed choice never leaves a partial mutation behind
//! - `undo` is the exact inverse of a non-terminal `choose`
//! - A terminal `choose` completes the session; the caller discards it

use serde::{Deserialize, Serialize};

use crate::error::ChoiceError;
use crate::ids::{NodeKey, SessionId};
use crate::story::{ChoiceTarget, StoryGraph};

/// One step of a play-through: the node the user was on and what they picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub node: NodeKey,
    pub choice: String,
}

impl HistoryEntry {
    pub fn new(node: NodeKey, choice: impl Into<String>) -> Self {
        Self {
            node,
            choice: choice.into(),
        }
    }
}

/// Result of a successful `choose`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The session moved on and is still active.
    Advanced { to: NodeKey },
    /// The narrative reached an ending; `history` is the complete trace.
    Ended {
        ending: NodeKey,
        history: Vec<HistoryEntry>,
    },
}

/// Result of `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The last entry was removed; the session is back on `entry.node`.
    Undone { entry: HistoryEntry },
    /// History was already empty; nothing changed.
    NothingToUndo,
}

/// A user's live traversal state.
///
/// # Invariants
///
/// - `current` is always set
/// - `history` is empty only at `begin` or after undoing every choice; a
///   cyclic story can bring a session back to its start with history left
/// - `history` only grows through `choose` and only shrinks through `undo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    current: NodeKey,
    history: Vec<HistoryEntry>,
}

impl Session {
    /// Begin a fresh session at `start` with an empty history.
    pub fn begin(start: NodeKey) -> Self {
        Self {
            id: SessionId::new(),
            current: start,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn current_node(&self) -> &NodeKey {
        &self.current
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Apply the choice labelled `selected` at the current node.
    ///
    /// Matching is exact and only against the current node's choices, so a
    /// stale selection from an earlier node is rejected.
    ///
    /// Arriving at a node without choices ends the narrative there, the same
    /// as picking a choice that targets the terminal sentinel.
    ///
    /// # Errors
    ///
    /// - `ChoiceError::InvalidChoice` if no current choice has that text
    /// - `ChoiceError::DanglingTarget` if the choice leads to a missing node
    ///
    /// The session is unchanged on error.
    pub fn choose(
        &mut self,
        graph: &StoryGraph,
        selected: &str,
    ) -> Result<Transition, ChoiceError> {
        let invalid = || ChoiceError::InvalidChoice {
            node: self.current.clone(),
            selected: selected.to_string(),
        };

        let node = graph.get(&self.current).ok_or_else(invalid)?;
        let choice = node.find_choice(selected).ok_or_else(invalid)?;

        match choice.target() {
            ChoiceTarget::End => {
                let ending = self.current.clone();
                self.history
                    .push(HistoryEntry::new(self.current.clone(), selected));
                Ok(Transition::Ended {
                    ending,
                    history: self.history.clone(),
                })
            }
            ChoiceTarget::Node(target) => {
                let Some(next) = graph.get(target) else {
                    return Err(ChoiceError::DanglingTarget {
                        from: self.current.clone(),
                        target: target.clone(),
                    });
                };

                let from = std::mem::replace(&mut self.current, target.clone());
                self.history.push(HistoryEntry::new(from, selected));

                if next.is_dead_end() {
                    Ok(Transition::Ended {
                        ending: target.clone(),
                        history: self.history.clone(),
                    })
                } else {
                    Ok(Transition::Advanced { to: target.clone() })
                }
            }
        }
    }

    /// Step back over the last choice.
    pub fn undo(&mut self) -> UndoOutcome {
        match self.history.pop() {
            Some(entry) => {
                self.current = entry.node.clone();
                UndoOutcome::Undone { entry }
            }
            None => UndoOutcome::NothingToUndo,
        }
    }
}
