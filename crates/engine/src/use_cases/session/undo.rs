use std::sync::Arc;

use questline_domain::{StoryGraph, UndoOutcome, UserId};

use super::{scene_at, SessionError, UndoResult};
use crate::stores::SessionStore;

/// Use case for stepping back over the last choice.
pub struct UndoChoice {
    story: Arc<StoryGraph>,
    sessions: Arc<SessionStore>,
}

impl UndoChoice {
    pub fn new(story: Arc<StoryGraph>, sessions: Arc<SessionStore>) -> Self {
        Self { story, sessions }
    }

    /// Undo on a fresh session is not an error; it reports `NothingToUndo`.
    pub async fn execute(&self, user: &UserId) -> Result<UndoResult, SessionError> {
        let mut slot = self.sessions.lock(user).await;
        let session = slot.as_mut().ok_or(SessionError::NoActiveSession)?;

        match session.undo() {
            UndoOutcome::Undone { entry } => {
                tracing::debug!(
                    user_id = %user,
                    session_id = %session.id(),
                    back_to = %entry.node,
                    "Choice undone"
                );
                let scene = scene_at(&self.story, session.current_node(), session.can_undo())?;
                Ok(UndoResult::Undone(scene))
            }
            UndoOutcome::NothingToUndo => {
                let scene = scene_at(&self.story, session.current_node(), false)?;
                Ok(UndoResult::NothingToUndo(scene))
            }
        }
    }
}
