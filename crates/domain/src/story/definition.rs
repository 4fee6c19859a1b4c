//! Raw story source format.
//!
//! ```json
//! {
//!   "start": {
//!     "text": "You wake up in a forest.",
//!     "image": "images/forest.png",
//!     "choices": [
//!       { "text": "Go left", "next": "left" },
//!       { "text": "Lie down", "next": "END" }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Literal `next` value marking the end of the narrative.
pub const END_SENTINEL: &str = "END";

/// Story source: node key -> node fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryDefinition {
    pub nodes: BTreeMap<String, NodeDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChoiceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub text: String,
    pub next: String,
}

impl StoryDefinition {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add a node (builder style, mostly for tests and fixtures).
    pub fn with_node(mut self, key: impl Into<String>, node: NodeDefinition) -> Self {
        self.nodes.insert(key.into(), node);
        self
    }
}

impl NodeDefinition {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            choices: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_choice(mut self, text: impl Into<String>, next: impl Into<String>) -> Self {
        self.choices.push(ChoiceDefinition {
            text: text.into(),
            next: next.into(),
        });
        self
    }
}
