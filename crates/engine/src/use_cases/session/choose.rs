use std::sync::Arc;

use questline_domain::{
    render_summary, ChoiceError, HistoryEntry, NodeKey, SessionId, StoryGraph, Transition, UserId,
};

use super::start::reset_and_restart;
use super::{scene_at, ChoiceOutcome, EndingReport, Scene, SessionError};
use crate::stores::SessionStore;
use crate::use_cases::endings::EndingsTracker;
use crate::use_cases::summary::NarrativeInsight;

/// Use case for applying a choice to the user's session.
pub struct MakeChoice {
    story: Arc<StoryGraph>,
    sessions: Arc<SessionStore>,
    endings: Arc<EndingsTracker>,
    insight: Arc<NarrativeInsight>,
}

/// A finished play-through, taken out of the store.
struct Finished {
    session_id: SessionId,
    ending: NodeKey,
    scene: Scene,
    history: Vec<HistoryEntry>,
}

impl MakeChoice {
    pub fn new(
        story: Arc<StoryGraph>,
        sessions: Arc<SessionStore>,
        endings: Arc<EndingsTracker>,
        insight: Arc<NarrativeInsight>,
    ) -> Self {
        Self {
            story,
            sessions,
            endings,
            insight,
        }
    }

    /// Pick the choice labelled `selected` at the user's current node.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if the user has not started
    /// - `InvalidChoice` if nothing at the current node has that label; the
    ///   session is unchanged and the error carries the valid labels
    pub async fn execute(
        &self,
        user: &UserId,
        selected: &str,
    ) -> Result<ChoiceOutcome, SessionError> {
        let finished = {
            let mut slot = self.sessions.lock(user).await;
            let session = slot.as_mut().ok_or(SessionError::NoActiveSession)?;

            match session.choose(&self.story, selected) {
                Ok(Transition::Advanced { to }) => {
                    tracing::debug!(
                        user_id = %user,
                        session_id = %session.id(),
                        to = %to,
                        "Choice applied"
                    );
                    let scene = scene_at(&self.story, &to, session.can_undo())?;
                    return Ok(ChoiceOutcome::Advanced(scene));
                }
                Ok(Transition::Ended { ending, history }) => {
                    let finished = Finished {
                        session_id: session.id(),
                        scene: scene_at(&self.story, &ending, false)?,
                        ending,
                        history,
                    };
                    *slot = None;
                    finished
                }
                Err(ChoiceError::InvalidChoice { node, .. }) => {
                    tracing::debug!(user_id = %user, node = %node, selected, "Invalid choice");
                    let options = self
                        .story
                        .get(&node)
                        .map(|n| n.option_texts())
                        .unwrap_or_default();
                    return Err(SessionError::InvalidChoice { options });
                }
                Err(ChoiceError::DanglingTarget { from, target }) => {
                    tracing::warn!(
                        user_id = %user,
                        node = %from,
                        target = %target,
                        "Choice leads to a missing node, restarting session"
                    );
                    let scene = reset_and_restart(&self.story, &mut slot)?;
                    return Ok(ChoiceOutcome::Restarted {
                        missing_target: target,
                        scene,
                    });
                }
            }
        };

        Ok(ChoiceOutcome::Ended(Box::new(
            self.finish(user, finished).await,
        )))
    }

    /// Record, summarize and enrich a finished play-through.
    ///
    /// Runs without the session guard; nothing here can fail the ending.
    async fn finish(&self, user: &UserId, finished: Finished) -> EndingReport {
        let Finished {
            session_id,
            ending,
            scene,
            history,
        } = finished;

        tracing::info!(
            user_id = %user,
            session_id = %session_id,
            ending = %ending,
            choices = history.len(),
            "Ending reached"
        );

        let newly_unlocked = match self.endings.record(user, &ending).await {
            Ok(newly_unlocked) => newly_unlocked,
            Err(e) => {
                tracing::warn!(user_id = %user, ending = %ending, error = %e, "Failed to record ending");
                false
            }
        };

        let summary = render_summary(&self.story, &history);
        let insight = self.insight.enrich(&summary).await;

        let coverage = match self.endings.coverage(user).await {
            Ok(coverage) => Some(coverage),
            Err(e) => {
                tracing::warn!(user_id = %user, error = %e, "Failed to read endings coverage");
                None
            }
        };

        EndingReport {
            ending,
            scene,
            history,
            summary,
            insight,
            newly_unlocked,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::infrastructure::ports::{
        LlmError, LlmResponse, MockEndingsRepo, MockLlmPort, PersistenceError,
    };
    use crate::test_fixtures::{broken, crossroads, key, tower, user, TestHarness};
    use crate::use_cases::endings::Coverage;
    use crate::use_cases::session::{ChoiceOutcome, EndingReport, SessionError};

    fn ended(outcome: ChoiceOutcome) -> EndingReport {
        match outcome {
            ChoiceOutcome::Ended(report) => *report,
            other => panic!("expected an ending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn choose_without_session_fails() {
        let harness = TestHarness::new(crossroads());
        let err = harness
            .use_cases
            .choose
            .execute(&user("1"), "Go left")
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NoActiveSession);
    }

    #[tokio::test]
    async fn advancing_shows_next_scene() {
        let harness = TestHarness::new(tower());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let outcome = harness.use_cases.choose.execute(&u, "Enter").await.unwrap();
        let ChoiceOutcome::Advanced(scene) = outcome else {
            panic!("expected to advance");
        };
        assert_eq!(scene.key, key("hall"));
        assert!(scene.can_undo);
        assert_eq!(scene.options, vec!["Climb", "Back out"]);
    }

    #[tokio::test]
    async fn invalid_choice_reports_current_options() {
        let harness = TestHarness::new(tower());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();
        harness.use_cases.choose.execute(&u, "Enter").await.unwrap();

        // "Leave" belongs to the start node, not the hall
        let err = harness.use_cases.choose.execute(&u, "Leave").await.unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidChoice {
                options: vec!["Climb".to_string(), "Back out".to_string()]
            }
        );

        let progress = harness.use_cases.progress.execute(&u).await;
        assert_eq!(progress.len(), 1);
        let scene = harness.use_cases.progress.current_scene(&u).await.unwrap();
        assert_eq!(scene.key, key("hall"));
    }

    #[tokio::test]
    async fn sentinel_ending_records_current_node() {
        let harness = TestHarness::new(crossroads());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();
        harness.use_cases.choose.execute(&u, "Go right").await.unwrap();

        let report = ended(harness.use_cases.choose.execute(&u, "Finish").await.unwrap());

        assert_eq!(report.ending, key("end1"));
        assert_eq!(report.scene.image.as_deref(), Some("inn.png"));
        assert_eq!(report.history.len(), 2);
        assert!(report.newly_unlocked);
        assert_eq!(report.coverage, Some(Coverage { unlocked: 1, total: 2 }));
        assert_eq!(
            report.summary,
            "Your journey:\n\
             - You stand at a crossroads. → Go right\n\
             - The road ends at a quiet inn. → Finish"
        );
        assert_eq!(report.insight, None);

        // back to idle, and the store forgets the user
        assert!(harness.sessions.is_empty());
        assert!(harness.use_cases.progress.current_scene(&u).await.is_none());
        assert_eq!(
            harness.use_cases.choose.execute(&u, "Finish").await.unwrap_err(),
            SessionError::NoActiveSession
        );
    }

    #[tokio::test]
    async fn dead_end_ending_records_target() {
        let harness = TestHarness::new(crossroads());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let report = ended(harness.use_cases.choose.execute(&u, "Go left").await.unwrap());

        assert_eq!(report.ending, key("left"));
        assert!(report.scene.options.is_empty());
        assert!(report.scene.story_over);
        assert_eq!(report.history.len(), 1);
        assert!(harness
            .endings
            .unlocked(&u)
            .await
            .unwrap()
            .contains(&key("left")));
    }

    #[tokio::test]
    async fn repeat_ending_is_not_new() {
        let harness = TestHarness::new(crossroads());
        let u = user("1");

        for expected_new in [true, false] {
            harness.use_cases.start.execute(&u).await.unwrap();
            let report = ended(harness.use_cases.choose.execute(&u, "Go left").await.unwrap());
            assert_eq!(report.newly_unlocked, expected_new);
            assert_eq!(report.coverage, Some(Coverage { unlocked: 1, total: 2 }));
        }
    }

    #[tokio::test]
    async fn dangling_target_restarts_session() {
        let harness = TestHarness::new(broken());
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let outcome = harness
            .use_cases
            .choose
            .execute(&u, "Walk into the fog")
            .await
            .unwrap();

        let ChoiceOutcome::Restarted {
            missing_target,
            scene,
        } = outcome
        else {
            panic!("expected a restart");
        };
        assert_eq!(missing_target, key("nowhere"));
        assert_eq!(scene.key, key("start"));
        assert!(harness.use_cases.progress.execute(&u).await.is_empty());

        // the fresh session is usable
        let report = ended(harness.use_cases.choose.execute(&u, "Wait").await.unwrap());
        assert_eq!(report.ending, key("start"));
    }

    #[tokio::test]
    async fn persistence_failure_still_delivers_summary() {
        let mut repo = MockEndingsRepo::new();
        repo.expect_add_to_set()
            .returning(|_, _| Err(PersistenceError::io("write_endings", "disk full")));
        repo.expect_get_set()
            .returning(|_| Err(PersistenceError::io("read_endings", "disk full")));

        let harness = TestHarness::build(crossroads(), Arc::new(repo), None);
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let report = ended(harness.use_cases.choose.execute(&u, "Go left").await.unwrap());
        assert!(!report.newly_unlocked);
        assert_eq!(report.coverage, None);
        assert!(report.summary.starts_with("Your journey:"));
    }

    #[tokio::test]
    async fn insight_is_attached_when_available() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .times(1)
            .returning(|_| Ok(LlmResponse::text("Right would have led home.")));

        let harness = TestHarness::build(
            crossroads(),
            Arc::new(crate::infrastructure::persistence::InMemoryEndingsRepo::new()),
            Some(Arc::new(llm)),
        );
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let report = ended(harness.use_cases.choose.execute(&u, "Go left").await.unwrap());
        assert_eq!(report.insight.as_deref(), Some("Right would have led home."));
    }

    #[tokio::test]
    async fn insight_failure_is_not_an_error() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::Unavailable));

        let harness = TestHarness::build(
            crossroads(),
            Arc::new(crate::infrastructure::persistence::InMemoryEndingsRepo::new()),
            Some(Arc::new(llm)),
        );
        let u = user("1");
        harness.use_cases.start.execute(&u).await.unwrap();

        let report = ended(harness.use_cases.choose.execute(&u, "Go left").await.unwrap());
        assert_eq!(report.insight, None);
        assert!(report.newly_unlocked);
    }
}
