//! Endings use cases.
//!
//! Tracks which endings each user has discovered across sessions and how
//! that compares to the endings the current story offers.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use questline_domain::{NodeKey, StoryGraph, UserId};

use crate::infrastructure::ports::{EndingsRepo, PersistenceError};

/// Discovered endings versus endings available in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub unlocked: usize,
    pub total: usize,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.unlocked == self.total
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unlocked, self.total)
    }
}

/// Records endings and answers coverage queries.
///
/// Stored keys that are no longer endings in the loaded story stay in storage
/// but never count towards coverage.
pub struct EndingsTracker {
    repo: Arc<dyn EndingsRepo>,
    story: Arc<StoryGraph>,
}

impl EndingsTracker {
    pub fn new(repo: Arc<dyn EndingsRepo>, story: Arc<StoryGraph>) -> Self {
        Self { repo, story }
    }

    /// Add an ending to the user's record. Returns `true` the first time.
    pub async fn record(&self, user: &UserId, ending: &NodeKey) -> Result<bool, PersistenceError> {
        let newly_unlocked = self.repo.add_to_set(user, ending).await?;
        if newly_unlocked {
            tracing::info!(user_id = %user, ending = %ending, "New ending unlocked");
        }
        Ok(newly_unlocked)
    }

    pub async fn unlocked(&self, user: &UserId) -> Result<BTreeSet<NodeKey>, PersistenceError> {
        self.repo.get_set(user).await
    }

    pub async fn coverage(&self, user: &UserId) -> Result<Coverage, PersistenceError> {
        let unlocked = self.unlocked(user).await?;
        let all = self.story.all_ending_keys();
        Ok(Coverage {
            unlocked: unlocked.intersection(all).count(),
            total: all.len(),
        })
    }

    /// Endings of the current story the user has not reached yet.
    pub async fn missing(&self, user: &UserId) -> Result<BTreeSet<NodeKey>, PersistenceError> {
        let unlocked = self.unlocked(user).await?;
        Ok(self
            .story
            .all_ending_keys()
            .difference(&unlocked)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryEndingsRepo;
    use crate::infrastructure::ports::MockEndingsRepo;
    use questline_domain::{NodeDefinition, StoryDefinition};

    fn key(s: &str) -> NodeKey {
        NodeKey::new(s).unwrap()
    }

    fn user(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    /// Endings: `end1` (sentinel) and `left` (dead end).
    fn story() -> Arc<StoryGraph> {
        let def = StoryDefinition::default()
            .with_node(
                "start",
                NodeDefinition::new("Crossroads")
                    .with_choice("Go left", "left")
                    .with_choice("Go right", "right"),
            )
            .with_node("left", NodeDefinition::new("A wall"))
            .with_node(
                "right",
                NodeDefinition::new("A river").with_choice("Swim", "END"),
            )
            .with_node("end1", NodeDefinition::new("Home").with_choice("Rest", "END"));
        Arc::new(StoryGraph::from_definition(def).unwrap())
    }

    fn tracker() -> EndingsTracker {
        EndingsTracker::new(Arc::new(InMemoryEndingsRepo::new()), story())
    }

    #[tokio::test]
    async fn record_is_idempotent() {
        let tracker = tracker();
        assert!(tracker.record(&user("1"), &key("left")).await.unwrap());
        assert!(!tracker.record(&user("1"), &key("left")).await.unwrap());
        assert_eq!(tracker.unlocked(&user("1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn coverage_counts_against_story_endings() {
        let tracker = tracker();
        let total = story().all_ending_keys().len();

        assert_eq!(
            tracker.coverage(&user("1")).await.unwrap(),
            Coverage { unlocked: 0, total }
        );

        tracker.record(&user("1"), &key("left")).await.unwrap();
        let coverage = tracker.coverage(&user("1")).await.unwrap();
        assert_eq!(coverage.unlocked, 1);
        assert_eq!(coverage.to_string(), format!("1/{total}"));
    }

    #[tokio::test]
    async fn stale_keys_do_not_count() {
        let tracker = tracker();
        tracker.record(&user("1"), &key("removed_ending")).await.unwrap();

        let coverage = tracker.coverage(&user("1")).await.unwrap();
        assert_eq!(coverage.unlocked, 0);
        // still stored
        assert!(tracker
            .unlocked(&user("1"))
            .await
            .unwrap()
            .contains(&key("removed_ending")));
    }

    #[tokio::test]
    async fn missing_lists_undiscovered_endings() {
        let tracker = tracker();
        tracker.record(&user("1"), &key("left")).await.unwrap();

        let missing = tracker.missing(&user("1")).await.unwrap();
        assert!(!missing.contains(&key("left")));
        assert_eq!(missing.len(), story().all_ending_keys().len() - 1);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let tracker = tracker();
        tracker.record(&user("1"), &key("left")).await.unwrap();
        assert!(tracker.unlocked(&user("2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_errors_propagate() {
        let mut repo = MockEndingsRepo::new();
        repo.expect_get_set()
            .returning(|_| Err(PersistenceError::serialization("boom")));

        let tracker = EndingsTracker::new(Arc::new(repo), story());
        assert!(tracker.coverage(&user("1")).await.is_err());
    }

    #[test]
    fn coverage_completion() {
        assert!(Coverage { unlocked: 2, total: 2 }.is_complete());
        assert!(!Coverage { unlocked: 1, total: 2 }.is_complete());
        assert!(!Coverage { unlocked: 0, total: 0 }.is_complete());
    }
}
