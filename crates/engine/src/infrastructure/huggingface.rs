//! Hugging Face Inference API client (text generation)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Client for a hosted text-generation model.
///
/// The API is text-in/text-out: the request's messages are flattened into a
/// single prompt.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl HuggingFaceClient {
    pub fn with_timeout(api_url: &str, api_token: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: api_url.to_string(),
            api_token: api_token.to_string(),
        }
    }
}

#[async_trait]
impl LlmPort for HuggingFaceClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let payload = InferenceRequest {
            inputs: request.flattened_prompt(),
            parameters: InferenceParameters {
                temperature: request.temperature,
                max_new_tokens: request.max_tokens,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %error_text, "Hugging Face API error");
            return Err(LlmError::RequestFailed(format!("{status}: {error_text}")));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(LlmResponse::text(body.into_text()?))
    }
}

// =============================================================================
// Inference API types
// =============================================================================

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: String,
}

/// Text-generation endpoints answer with a list, some models with one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    List(Vec<Generated>),
    Single(Generated),
}

impl InferenceResponse {
    fn into_text(self) -> Result<String, LlmError> {
        match self {
            Self::List(items) => items
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| LlmError::InvalidResponse("Empty generation list".to_string())),
            Self::Single(g) => Ok(g.generated_text),
        }
    }
}
