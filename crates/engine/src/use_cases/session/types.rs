//! Session use case results and errors.

use questline_domain::{HistoryEntry, NodeKey, StoryNode};

use crate::use_cases::endings::Coverage;

/// What the transport shows for one story node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub key: NodeKey,
    pub text: String,
    pub image: Option<String>,
    /// Choice labels in story order.
    pub options: Vec<String>,
    pub can_undo: bool,
    /// The node has no choices, so the play-through is over once shown.
    pub story_over: bool,
}

impl Scene {
    pub fn from_node(node: &StoryNode, can_undo: bool) -> Self {
        Self {
            key: node.key().clone(),
            text: node.text().to_string(),
            image: node.image().map(str::to_string),
            options: node.option_texts(),
            can_undo,
            story_over: node.is_dead_end(),
        }
    }
}

/// Result of picking a choice.
#[derive(Debug, Clone)]
pub enum ChoiceOutcome {
    /// Still playing; show the next scene.
    Advanced(Scene),
    /// The choice pointed at a node missing from the story. The session was
    /// reset to the start.
    Restarted { missing_target: NodeKey, scene: Scene },
    /// An ending was reached and the session is over.
    Ended(Box<EndingReport>),
}

/// Everything produced when a play-through ends.
#[derive(Debug, Clone)]
pub struct EndingReport {
    pub ending: NodeKey,
    /// The ending node itself.
    pub scene: Scene,
    pub history: Vec<HistoryEntry>,
    pub summary: String,
    pub insight: Option<String>,
    /// `false` if the ending was known already or could not be persisted.
    pub newly_unlocked: bool,
    /// `None` when the endings record could not be read.
    pub coverage: Option<Coverage>,
}

/// Result of an undo request on an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoResult {
    Undone(Scene),
    /// History was empty; the current scene is unchanged.
    NothingToUndo(Scene),
}

impl UndoResult {
    pub fn scene(&self) -> &Scene {
        match self {
            Self::Undone(scene) | Self::NothingToUndo(scene) => scene,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No active session")]
    NoActiveSession,
    #[error("That choice is not available here")]
    InvalidChoice { options: Vec<String> },
    #[error("The story is not available")]
    StoryUnavailable,
}
