use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::StoryLoadError;
use crate::ids::NodeKey;

use super::definition::{StoryDefinition, END_SENTINEL};
use super::node::{Choice, ChoiceTarget, StoryNode};

/// Immutable story graph.
///
/// # Invariants
///
/// - Every node key is valid and unique
/// - Choice texts are unique among siblings
/// - A non-empty graph contains the start node
/// - `ending_keys` is exactly the set of nodes for which `is_ending()` holds
///
/// Choices may point at keys the graph does not contain. Story content is
/// external, so such dangling targets are reported by [`dangling_targets`]
/// and handled during traversal rather than rejected here.
///
/// [`dangling_targets`]: StoryGraph::dangling_targets
#[derive(Debug, Clone)]
pub struct StoryGraph {
    nodes: HashMap<NodeKey, StoryNode>,
    start: NodeKey,
    ending_keys: BTreeSet<NodeKey>,
}

impl StoryGraph {
    /// A graph with no nodes at all (the story source was missing).
    pub fn empty() -> Self {
        Self {
            nodes: HashMap::new(),
            start: NodeKey::start(),
            ending_keys: BTreeSet::new(),
        }
    }

    /// Parse and build a graph from JSON source text.
    pub fn from_json_str(json: &str) -> Result<Self, StoryLoadError> {
        let definition = StoryDefinition::from_json_str(json)?;
        Self::from_definition(definition)
    }

    /// Build and validate a graph.
    ///
    /// # Errors
    ///
    /// Returns `StoryLoadError::Invalid` when a key or choice text is empty,
    /// two keys collide after trimming, sibling choices share a text, or a
    /// non-empty story has no start node.
    pub fn from_definition(definition: StoryDefinition) -> Result<Self, StoryLoadError> {
        let mut nodes = HashMap::with_capacity(definition.nodes.len());

        for (raw_key, raw_node) in definition.nodes {
            let key = NodeKey::new(raw_key.as_str())?;
            if nodes.contains_key(&key) {
                return Err(StoryLoadError::invalid(format!(
                    "duplicate node key '{key}'"
                )));
            }

            let mut seen = HashSet::new();
            let mut choices = Vec::with_capacity(raw_node.choices.len());
            for raw_choice in raw_node.choices {
                if raw_choice.text.trim().is_empty() {
                    return Err(StoryLoadError::invalid(format!(
                        "node '{key}' has a choice with empty text"
                    )));
                }
                if !seen.insert(raw_choice.text.clone()) {
                    return Err(StoryLoadError::invalid(format!(
                        "node '{key}' has duplicate choice '{}'",
                        raw_choice.text
                    )));
                }

                let target = if raw_choice.next == END_SENTINEL {
                    ChoiceTarget::End
                } else {
                    let next = NodeKey::new(raw_choice.next.as_str()).map_err(|_| {
                        StoryLoadError::invalid(format!(
                            "choice '{}' at node '{key}' has an empty target",
                            raw_choice.text
                        ))
                    })?;
                    ChoiceTarget::Node(next)
                };
                choices.push(Choice::new(raw_choice.text, target));
            }

            let node = StoryNode::new(key.clone(), raw_node.text, raw_node.image, choices);
            nodes.insert(key, node);
        }

        let start = NodeKey::start();
        if !nodes.is_empty() && !nodes.contains_key(&start) {
            return Err(StoryLoadError::invalid(format!(
                "story has no '{start}' node"
            )));
        }

        let ending_keys = nodes
            .values()
            .filter(|node| node.is_ending())
            .map(|node| node.key().clone())
            .collect();

        Ok(Self {
            nodes,
            start,
            ending_keys,
        })
    }

    pub fn get(&self, key: &NodeKey) -> Option<&StoryNode> {
        self.nodes.get(key)
    }

    pub fn start_key(&self) -> &NodeKey {
        &self.start
    }

    pub fn start_node(&self) -> Option<&StoryNode> {
        self.nodes.get(&self.start)
    }

    /// Keys of every ending node; computed once when the graph is built.
    pub fn all_ending_keys(&self) -> &BTreeSet<NodeKey> {
        &self.ending_keys
    }

    pub fn is_ending(&self, key: &NodeKey) -> bool {
        self.ending_keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(node, target)` pairs whose target is not in the graph, sorted.
    pub fn dangling_targets(&self) -> Vec<(NodeKey, NodeKey)> {
        let mut dangling: Vec<(NodeKey, NodeKey)> = self
            .nodes
            .values()
            .flat_map(|node| {
                node.choices().iter().filter_map(move |choice| match choice.target() {
                    ChoiceTarget::Node(target) if !self.nodes.contains_key(target) => {
                        Some((node.key().clone(), target.clone()))
                    }
                    _ => None,
                })
            })
            .collect();
        dangling.sort();
        dangling
    }
}
