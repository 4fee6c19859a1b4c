//! Rendering of a completed play-through.

use crate::session::HistoryEntry;
use crate::story::StoryGraph;

/// Rendered when a history is empty.
pub const NO_CHOICES_SUMMARY: &str = "No choices were made.";

const SUMMARY_HEADER: &str = "Your journey:";

/// Render a history as one "node text → choice text" line per step.
///
/// Deterministic and side-effect free. A node that is no longer in the graph
/// renders as its key in brackets.
pub fn render_summary(graph: &StoryGraph, history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return NO_CHOICES_SUMMARY.to_string();
    }

    let mut out = String::from(SUMMARY_HEADER);
    for entry in history {
        let node_text = match graph.get(&entry.node) {
            Some(node) => node.text().to_string(),
            None => format!("[{}]", entry.node),
        };
        out.push('\n');
        out.push_str(&format!("- {node_text} → {}", entry.choice));
    }
    out
}

/// Prompt handed to the narrative-insight collaborator.
pub fn insight_prompt(summary: &str) -> String {
    format!(
        "Summarize the following story:\n{summary}\n\
         Then speculate about what could have happened if different choices had been made."
    )
}
