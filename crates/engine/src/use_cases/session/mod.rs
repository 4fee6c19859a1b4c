//! Session use cases.
//!
//! Drives one user's play-through: starting, choosing, undoing and
//! inspecting progress. Every operation holds the user's session guard for
//! its whole read-modify-write; ending processing happens after the guard is
//! released.

use std::sync::Arc;

use questline_domain::{NodeKey, StoryGraph};

use crate::stores::SessionStore;
use crate::use_cases::endings::EndingsTracker;
use crate::use_cases::summary::NarrativeInsight;

mod choose;
mod progress;
mod start;
mod types;
mod undo;

pub use choose::MakeChoice;
pub use progress::GetProgress;
pub use start::StartSession;
pub use types::{ChoiceOutcome, EndingReport, Scene, SessionError, UndoResult};
pub use undo::UndoChoice;

/// Container for session use cases.
pub struct SessionUseCases {
    pub start: Arc<StartSession>,
    pub choose: Arc<MakeChoice>,
    pub undo: Arc<UndoChoice>,
    pub progress: Arc<GetProgress>,
}

impl SessionUseCases {
    pub fn new(
        start: Arc<StartSession>,
        choose: Arc<MakeChoice>,
        undo: Arc<UndoChoice>,
        progress: Arc<GetProgress>,
    ) -> Self {
        Self {
            start,
            choose,
            undo,
            progress,
        }
    }

    /// Wire every session use case over the same story and store.
    pub fn build(
        story: Arc<StoryGraph>,
        sessions: Arc<SessionStore>,
        endings: Arc<EndingsTracker>,
        insight: Arc<NarrativeInsight>,
    ) -> Self {
        Self::new(
            Arc::new(StartSession::new(story.clone(), sessions.clone())),
            Arc::new(MakeChoice::new(
                story.clone(),
                sessions.clone(),
                endings,
                insight,
            )),
            Arc::new(UndoChoice::new(story.clone(), sessions.clone())),
            Arc::new(GetProgress::new(story, sessions)),
        )
    }
}

/// Scene for `key`; a key the story does not know means the story is gone.
fn scene_at(story: &StoryGraph, key: &NodeKey, can_undo: bool) -> Result<Scene, SessionError> {
    story
        .get(key)
        .map(|node| Scene::from_node(node, can_undo))
        .ok_or(SessionError::StoryUnavailable)
}
