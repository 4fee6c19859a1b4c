//! Story source loader.

use std::path::Path;

use questline_domain::{StoryGraph, StoryLoadError};
use tokio::fs;

/// Load the story graph from a JSON file.
///
/// A missing file degrades to an empty graph so the process can still come
/// up; unreadable or malformed content is an error and should stop startup.
pub async fn load_story(path: impl AsRef<Path>) -> Result<StoryGraph, StoryLoadError> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "Story file not found, serving an empty story");
            return Ok(StoryGraph::empty());
        }
        Err(e) => return Err(StoryLoadError::Io(e)),
    };

    let graph = StoryGraph::from_json_str(&content)?;

    for (from, target) in graph.dangling_targets() {
        tracing::warn!(
            node = %from,
            target = %target,
            "Story choice points at a missing node; sessions will restart if it is picked"
        );
    }

    tracing::info!(
        path = %path.display(),
        nodes = graph.len(),
        endings = graph.all_ending_keys().len(),
        "Story loaded"
    );

    Ok(graph)
}
