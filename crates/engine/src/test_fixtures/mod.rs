//! Shared stories and wiring for tests.

use std::sync::Arc;

use questline_domain::{NodeDefinition, NodeKey, StoryDefinition, StoryGraph, UserId};

use crate::infrastructure::persistence::InMemoryEndingsRepo;
use crate::infrastructure::ports::{EndingsRepo, LlmPort};
use crate::stores::SessionStore;
use crate::use_cases::endings::EndingsTracker;
use crate::use_cases::summary::{NarrativeInsight, DEFAULT_INSIGHT_TIMEOUT};
use crate::use_cases::SessionUseCases;

pub fn key(s: &str) -> NodeKey {
    NodeKey::new(s).unwrap()
}

pub fn user(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

/// The crossroads story.
///
/// ```text
/// start --"Go left"--> left (no choices)
///       --"Go right"--> end1 --"Finish"--> END
/// ```
pub fn crossroads() -> StoryGraph {
    let def = StoryDefinition::default()
        .with_node(
            "start",
            NodeDefinition::new("You stand at a crossroads.")
                .with_choice("Go left", "left")
                .with_choice("Go right", "end1"),
        )
        .with_node("left", NodeDefinition::new("A wall blocks the path."))
        .with_node(
            "end1",
            NodeDefinition::new("The road ends at a quiet inn.")
                .with_image("inn.png")
                .with_choice("Finish", "END"),
        );
    StoryGraph::from_definition(def).unwrap()
}

/// A longer chain for undo tests: start -> hall -> stairs -> END.
pub fn tower() -> StoryGraph {
    let def = StoryDefinition::default()
        .with_node(
            "start",
            NodeDefinition::new("The tower door.")
                .with_choice("Enter", "hall")
                .with_choice("Leave", "END"),
        )
        .with_node(
            "hall",
            NodeDefinition::new("A dusty hall.")
                .with_choice("Climb", "stairs")
                .with_choice("Back out", "start"),
        )
        .with_node(
            "stairs",
            NodeDefinition::new("Endless stairs.").with_choice("Keep climbing", "END"),
        );
    StoryGraph::from_definition(def).unwrap()
}

/// Story whose only choice leads to a node that does not exist.
pub fn broken() -> StoryGraph {
    let def = StoryDefinition::default().with_node(
        "start",
        NodeDefinition::new("Fog.")
            .with_choice("Walk into the fog", "nowhere")
            .with_choice("Wait", "END"),
    );
    StoryGraph::from_definition(def).unwrap()
}

/// Everything a session test needs, wired the way `App` wires it.
pub struct TestHarness {
    pub story: Arc<StoryGraph>,
    pub sessions: Arc<SessionStore>,
    pub endings: Arc<EndingsTracker>,
    pub use_cases: SessionUseCases,
}

impl TestHarness {
    pub fn new(story: StoryGraph) -> Self {
        Self::build(story, Arc::new(InMemoryEndingsRepo::new()), None)
    }

    pub fn build(
        story: StoryGraph,
        repo: Arc<dyn EndingsRepo>,
        llm: Option<Arc<dyn LlmPort>>,
    ) -> Self {
        let story = Arc::new(story);
        let sessions = Arc::new(SessionStore::new());
        let endings = Arc::new(EndingsTracker::new(repo, story.clone()));
        let insight = Arc::new(match llm {
            Some(llm) => NarrativeInsight::new(llm, DEFAULT_INSIGHT_TIMEOUT),
            None => NarrativeInsight::disabled(),
        });
        let use_cases =
            SessionUseCases::build(story.clone(), sessions.clone(), endings.clone(), insight);

        Self {
            story,
            sessions,
            endings,
            use_cases,
        }
    }
}
