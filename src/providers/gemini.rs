// Google Gemini API provider implementation
//
// Uses the REST generateContent endpoint. The system instruction travels in
// `systemInstruction`; the ordered text and inline image parts form a single
// user turn. One call per request, no retries, bounded by a client timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::GenerationRequest;
use super::LlmProvider;
use crate::config::constants::{API_KEY_ENV, DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_BASE_URL};
use crate::config::GenerationConfig;
use crate::prompt::ContentPart;

/// Google Gemini API provider
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("api_key_set", &!self.api_key.is_empty())
            .finish()
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider with default endpoint and timeout
    pub fn new(api_key: String) -> Result<Self> {
        Self::build(
            api_key,
            GEMINI_BASE_URL.to_string(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create from the `[generation]` configuration section.
    /// The model itself travels on each `GenerationRequest`.
    pub fn from_config(api_key: String, config: &GenerationConfig) -> Result<Self> {
        Self::build(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Point at a different API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert a GenerationRequest to the Gemini wire format
    fn to_gemini_request(request: &GenerationRequest) -> GeminiRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
                ContentPart::InlineImage { data, mime_type } => GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect();

        let system_instruction = if request.system_instruction.trim().is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction {
                parts: vec![GeminiPart::Text {
                    text: request.system_instruction.clone(),
                }],
            })
        };

        GeminiRequest {
            system_instruction,
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
        }
    }

    /// Extract the generated text from a Gemini response
    fn from_gemini_response(response: GeminiResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (prompt blocked: {})", r))
                .unwrap_or_default();
            anyhow::bail!("Gemini returned no candidates in response{}", reason);
        };

        let content = candidate.content.with_context(|| {
            format!(
                "Gemini candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
        })?;

        let text: String = content
            .parts
            .into_iter()
            .filter(|part| !part.thought.unwrap_or(false))
            .filter_map(|part| part.text)
            .collect();

        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if self.api_key.is_empty() {
            anyhow::bail!("{} is not set; cannot call the Gemini API", API_KEY_ENV);
        }

        let model = request.model.trim();
        if model.is_empty() {
            anyhow::bail!("No Gemini model specified for generation request");
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let gemini_request = Self::to_gemini_request(request);

        tracing::debug!(
            model = %model,
            parts = request.parts.len(),
            images = request.image_count(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        Self::from_gemini_response(gemini_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
