//! Summary use cases.
//!
//! The journey summary itself is rendered by the domain; this module adds the
//! optional narrative insight from an external text generator.

use std::sync::Arc;
use std::time::Duration;

use questline_domain::insight_prompt;

use crate::infrastructure::ports::{ChatMessage, FinishReason, LlmError, LlmPort, LlmRequest};

/// Default bound on how long an ending waits for an insight.
pub const DEFAULT_INSIGHT_TIMEOUT: Duration = Duration::from_secs(30);

const INSIGHT_MAX_TOKENS: u32 = 300;
const INSIGHT_TEMPERATURE: f32 = 0.8;
const INSIGHT_SYSTEM_PROMPT: &str =
    "You are the narrator of an interactive story. Reply in plain prose, in a few short paragraphs.";

/// Best-effort enrichment of a journey summary.
///
/// Every failure degrades to "no insight"; the caller always has the plain
/// summary to deliver.
pub struct NarrativeInsight {
    llm: Option<Arc<dyn LlmPort>>,
    timeout: Duration,
}

impl NarrativeInsight {
    pub fn new(llm: Arc<dyn LlmPort>, timeout: Duration) -> Self {
        Self {
            llm: Some(llm),
            timeout,
        }
    }

    /// Insight that never calls out.
    pub fn disabled() -> Self {
        Self {
            llm: None,
            timeout: DEFAULT_INSIGHT_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn enrich(&self, summary: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;

        let request = LlmRequest::new(vec![ChatMessage::user(insight_prompt(summary))])
            .with_system_prompt(INSIGHT_SYSTEM_PROMPT)
            .with_temperature(INSIGHT_TEMPERATURE)
            .with_max_tokens(Some(INSIGHT_MAX_TOKENS));

        let result = match tokio::time::timeout(self.timeout, llm.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        };

        match result {
            Ok(response) if response.finish_reason == FinishReason::ContentFilter => {
                tracing::warn!("Narrative insight was filtered, dropping it");
                None
            }
            Ok(response) => {
                if response.finish_reason == FinishReason::Length {
                    tracing::debug!(max_tokens = INSIGHT_MAX_TOKENS, "Narrative insight cut short");
                }
                let text = response.content.trim();
                if text.is_empty() {
                    tracing::warn!("Narrative insight came back empty");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Narrative insight unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};
    use async_trait::async_trait;

    #[tokio::test]
    async fn disabled_returns_none() {
        assert_eq!(NarrativeInsight::disabled().enrich("Your journey:").await, None);
    }

    #[tokio::test]
    async fn sends_insight_prompt() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.messages.len() == 1
                    && request.messages[0].content.contains("- A wall → Go left")
                    && request.system_prompt.as_deref() == Some(INSIGHT_SYSTEM_PROMPT)
                    && request.temperature == Some(INSIGHT_TEMPERATURE)
                    && request.max_tokens == Some(INSIGHT_MAX_TOKENS)
            })
            .times(1)
            .returning(|_| Ok(LlmResponse::text("  Had you gone right...  ")));

        let insight = NarrativeInsight::new(Arc::new(llm), Duration::from_secs(1));
        let text = insight.enrich("Your journey:\n- A wall → Go left").await;

        assert_eq!(text.as_deref(), Some("Had you gone right..."));
    }

    #[tokio::test]
    async fn errors_degrade_to_none() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("503".into())));

        let insight = NarrativeInsight::new(Arc::new(llm), Duration::from_secs(1));
        assert_eq!(insight.enrich("summary").await, None);
    }

    #[tokio::test]
    async fn blank_response_is_none() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Ok(LlmResponse::text("   ")));

        let insight = NarrativeInsight::new(Arc::new(llm), Duration::from_secs(1));
        assert_eq!(insight.enrich("summary").await, None);
    }

    #[tokio::test]
    async fn filtered_response_is_none() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(LlmResponse {
                content: "[removed]".into(),
                finish_reason: FinishReason::ContentFilter,
            })
        });

        let insight = NarrativeInsight::new(Arc::new(llm), Duration::from_secs(1));
        assert_eq!(insight.enrich("summary").await, None);
    }

    #[tokio::test]
    async fn truncated_response_is_kept() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(LlmResponse {
                content: "Had you gone left, the".into(),
                finish_reason: FinishReason::Length,
            })
        });

        let insight = NarrativeInsight::new(Arc::new(llm), Duration::from_secs(1));
        assert_eq!(
            insight.enrich("summary").await.as_deref(),
            Some("Had you gone left, the")
        );
    }

    struct SlowLlm;

    #[async_trait]
    impl LlmPort for SlowLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(LlmResponse::text("too late"))
        }
    }

    #[tokio::test]
    async fn timeout_degrades_to_none() {
        let insight = NarrativeInsight::new(Arc::new(SlowLlm), Duration::from_millis(50));
        assert_eq!(insight.enrich("summary").await, None);
    }
}
