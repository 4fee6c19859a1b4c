use std::sync::Arc;

use questline_domain::{HistoryEntry, StoryGraph, UserId};

use super::{scene_at, Scene};
use crate::stores::SessionStore;

/// Read-only views of a user's session.
pub struct GetProgress {
    story: Arc<StoryGraph>,
    sessions: Arc<SessionStore>,
}

impl GetProgress {
    pub fn new(story: Arc<StoryGraph>, sessions: Arc<SessionStore>) -> Self {
        Self { story, sessions }
    }

    /// Choices made so far, oldest first. Empty when idle.
    pub async fn execute(&self, user: &UserId) -> Vec<HistoryEntry> {
        let slot = self.sessions.lock(user).await;
        slot.as_ref()
            .map(|session| session.history().to_vec())
            .unwrap_or_default()
    }

    pub async fn current_scene(&self, user: &UserId) -> Option<Scene> {
        let slot = self.sessions.lock(user).await;
        let session = slot.as_ref()?;
        scene_at(&self.story, session.current_node(), session.can_undo()).ok()
    }
}
