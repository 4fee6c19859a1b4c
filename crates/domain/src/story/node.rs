use crate::ids::NodeKey;

/// Where a choice leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChoiceTarget {
    Node(NodeKey),
    /// The terminal sentinel: the narrative ends after this choice.
    End,
}

impl ChoiceTarget {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

/// A labelled edge out of a story node.
///
/// The label is unique among its siblings and is what users select by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    text: String,
    target: ChoiceTarget,
}

impl Choice {
    pub fn new(text: impl Into<String>, target: ChoiceTarget) -> Self {
        Self {
            text: text.into(),
            target,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target(&self) -> &ChoiceTarget {
        &self.target
    }
}

/// A node of the story graph.
///
/// # Invariants
///
/// - Choice texts are unique within the node
/// - Never mutated once the graph is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryNode {
    key: NodeKey,
    text: String,
    image: Option<String>,
    choices: Vec<Choice>,
}

impl StoryNode {
    pub(crate) fn new(
        key: NodeKey,
        text: String,
        image: Option<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            key,
            text,
            image,
            choices,
        }
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Choice labels in display order.
    pub fn option_texts(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.text.clone()).collect()
    }

    /// Exact-match lookup of a choice by its label.
    pub fn find_choice(&self, text: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.text == text)
    }

    /// True for dead ends and for nodes offering the terminal transition.
    pub fn is_ending(&self) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c.target.is_end())
    }

    pub fn is_dead_end(&self) -> bool {
        self.choices.is_empty()
    }
}
