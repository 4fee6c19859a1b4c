use std::sync::Arc;

use questline_domain::{Session, StoryGraph, UserId};

use super::{Scene, SessionError};
use crate::stores::session::SessionSlot;
use crate::stores::SessionStore;

/// Use case for (re)starting a user's play-through at the story's start.
pub struct StartSession {
    story: Arc<StoryGraph>,
    sessions: Arc<SessionStore>,
}

impl StartSession {
    pub fn new(story: Arc<StoryGraph>, sessions: Arc<SessionStore>) -> Self {
        Self { story, sessions }
    }

    /// Discard any session the user has and begin a new one.
    pub async fn execute(&self, user: &UserId) -> Result<Scene, SessionError> {
        let mut slot = self.sessions.lock(user).await;
        let scene = reset_and_restart(&self.story, &mut slot)?;

        match slot.as_ref() {
            Some(session) => {
                tracing::info!(user_id = %user, session_id = %session.id(), "Session started");
            }
            None => tracing::info!(user_id = %user, "Story is over at its start node"),
        }
        Ok(scene)
    }

    /// Explicit restart requested by the user.
    pub async fn restart(&self, user: &UserId) -> Result<Scene, SessionError> {
        tracing::debug!(user_id = %user, "Restart requested");
        self.execute(user).await
    }
}

/// Replace whatever is in `slot` with a fresh session at the start node.
///
/// Callers must already hold the user's guard. On `StoryUnavailable` the slot
/// is left idle. A start node without choices is shown with `story_over` set
/// and also leaves the slot idle; no ending is recorded for an empty journey.
pub(super) fn reset_and_restart(
    story: &StoryGraph,
    slot: &mut SessionSlot,
) -> Result<Scene, SessionError> {
    *slot = None;

    let node = story.start_node().ok_or(SessionError::StoryUnavailable)?;
    let scene = Scene::from_node(node, false);
    if !scene.story_over {
        *slot = Some(Session::begin(story.start_key().clone()));
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::{crossroads, key, user, TestHarness};
    use crate::use_cases::session::SessionError;
    use questline_domain::StoryGraph;

    #[tokio::test]
    async fn start_shows_start_scene() {
        let harness = TestHarness::new(crossroads());
        let scene = harness.use_cases.start.execute(&user("1")).await.unwrap();

        assert_eq!(scene.key, key("start"));
        assert_eq!(scene.options, vec!["Go left", "Go right"]);
        assert!(!scene.can_undo);
        assert!(!scene.story_over);
        assert!(harness.use_cases.progress.execute(&user("1")).await.is_empty());
    }

    #[tokio::test]
    async fn choiceless_start_is_over_and_idle() {
        let story = StoryGraph::from_json_str(r#"{"start": {"text": "Alone."}}"#).unwrap();
        let harness = TestHarness::new(story);
        let u = user("1");

        let scene = harness.use_cases.start.execute(&u).await.unwrap();
        assert_eq!(scene.key, key("start"));
        assert!(scene.options.is_empty());
        assert!(scene.story_over);

        assert!(harness.use_cases.progress.current_scene(&u).await.is_none());
        let err = harness.use_cases.choose.execute(&u, "anything").await.unwrap_err();
        assert_eq!(err, SessionError::NoActiveSession);

        let coverage = harness.endings.coverage(&u).await.unwrap();
        assert_eq!(coverage.unlocked, 0);
    }

    #[tokio::test]
    async fn start_discards_previous_session() {
        let harness = TestHarness::new(crossroads());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();
        harness.use_cases.choose.execute(&u, "Go right").await.unwrap();

        let scene = harness.use_cases.start.restart(&u).await.unwrap();

        assert_eq!(scene.key, key("start"));
        assert!(harness.use_cases.progress.execute(&u).await.is_empty());
    }

    #[tokio::test]
    async fn empty_story_is_unavailable() {
        let harness = TestHarness::new(StoryGraph::empty());
        let err = harness.use_cases.start.execute(&user("1")).await.unwrap_err();

        assert_eq!(err, SessionError::StoryUnavailable);
        assert!(harness
            .use_cases
            .progress
            .current_scene(&user("1"))
            .await
            .is_none());
    }
}
