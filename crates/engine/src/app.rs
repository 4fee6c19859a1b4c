//! Application state and composition.

use std::sync::Arc;

use questline_domain::{StoryGraph, StoryLoadError};

use crate::config::{EndingsStore, EngineConfig, InsightProvider};
use crate::infrastructure::{
    huggingface::HuggingFaceClient,
    ollama::OllamaClient,
    persistence::{InMemoryEndingsRepo, JsonFileEndingsRepo},
    ports::{EndingsRepo, LlmPort},
    resilient_llm::{ResilientLlmClient, RetryConfig},
    story_file::load_story,
};
use crate::stores::SessionStore;
use crate::use_cases;

/// Main application state.
///
/// Holds the loaded story, the live sessions and all use cases.
pub struct App {
    pub story: Arc<StoryGraph>,
    pub sessions: Arc<SessionStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub session: use_cases::SessionUseCases,
    pub endings: Arc<use_cases::EndingsTracker>,
    pub insight: Arc<use_cases::NarrativeInsight>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        story: StoryGraph,
        endings_repo: Arc<dyn EndingsRepo>,
        insight: use_cases::NarrativeInsight,
    ) -> Self {
        let story = Arc::new(story);
        let sessions = Arc::new(SessionStore::new());
        let endings = Arc::new(use_cases::EndingsTracker::new(endings_repo, story.clone()));
        let insight = Arc::new(insight);

        let session = use_cases::SessionUseCases::build(
            story.clone(),
            sessions.clone(),
            endings.clone(),
            insight.clone(),
        );

        Self {
            story,
            sessions,
            use_cases: UseCases {
                session,
                endings,
                insight,
            },
        }
    }

    /// Load the story and build every adapter the configuration asks for.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, StoryLoadError> {
        let story = load_story(&config.story_file).await?;
        Ok(Self::new(
            story,
            endings_repo(&config.endings),
            insight(config),
        ))
    }
}

fn endings_repo(store: &EndingsStore) -> Arc<dyn EndingsRepo> {
    match store {
        EndingsStore::JsonFiles(dir) => {
            tracing::info!(dir = %dir.display(), "Endings stored as JSON files");
            Arc::new(JsonFileEndingsRepo::new(dir))
        }
        EndingsStore::Memory => {
            tracing::info!("Endings stored in memory only");
            Arc::new(InMemoryEndingsRepo::new())
        }
    }
}

fn insight(config: &EngineConfig) -> use_cases::NarrativeInsight {
    let timeout_secs = config.insight_timeout.as_secs().max(1);
    let client: Arc<dyn LlmPort> = match &config.insight {
        InsightProvider::HuggingFace { api_url, api_token } => Arc::new(
            HuggingFaceClient::with_timeout(api_url, api_token, timeout_secs),
        ),
        InsightProvider::Ollama { base_url, model } => {
            Arc::new(OllamaClient::with_timeout(base_url, model, timeout_secs))
        }
        InsightProvider::Disabled => {
            tracing::info!("Narrative insight disabled");
            return use_cases::NarrativeInsight::disabled();
        }
    };

    let retry_config = RetryConfig {
        max_retries: config.insight_max_retries,
        ..RetryConfig::default()
    };
    tracing::info!(
        provider = config.insight.name(),
        max_retries = retry_config.max_retries,
        timeout_secs,
        "Narrative insight configured"
    );

    // The outer timeout bounds all attempts together
    let llm = Arc::new(ResilientLlmClient::new(client, retry_config));
    use_cases::NarrativeInsight::new(llm, config.insight_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(story_file: PathBuf, endings: EndingsStore) -> EngineConfig {
        EngineConfig {
            story_file,
            endings,
            insight: InsightProvider::Disabled,
            insight_timeout: Duration::from_secs(1),
            insight_max_retries: 0,
            console_user: "local".into(),
        }
    }

    #[tokio::test]
    async fn from_config_loads_story() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let story_file = temp_dir.path().join("story.json");
        std::fs::write(
            &story_file,
            r#"{"start": {"text": "Hi", "choices": [{"text": "Bye", "next": "END"}]}}"#,
        )
        .unwrap();

        let app = App::from_config(&config(story_file, EndingsStore::Memory))
            .await
            .unwrap();

        assert_eq!(app.story.len(), 1);
        assert!(!app.use_cases.insight.is_enabled());
    }

    #[tokio::test]
    async fn from_config_without_story_serves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = App::from_config(&config(
            temp_dir.path().join("missing.json"),
            EndingsStore::JsonFiles(temp_dir.path().join("endings")),
        ))
        .await
        .unwrap();

        assert!(app.story.is_empty());
    }

    #[test]
    fn configured_provider_enables_insight() {
        let mut config = config(PathBuf::from("story.json"), EndingsStore::Memory);
        config.insight = InsightProvider::Ollama {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
        };
        assert!(insight(&config).is_enabled());
    }
}
