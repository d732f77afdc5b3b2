//! Google Gemini `generateContent` backend.
//!
//! Sends a single non-streaming request per attempt:
//!
//! ```text
//! POST {base_url}/v1beta/models/{model}:generateContent
//! x-goog-api-key: {api_key}
//! ```
//!
//! The prompt goes in as one text part; image-capable candidates also get an
//! `inline_data` part carrying base64 bytes and the MIME type. Reply text is
//! the concatenation of every text part in the first candidate.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tutor::config::GeminiConfig;
//! use tutor::llm::backend::{GenerationBackend, GenerationRequest};
//! use tutor::llm::gemini::GeminiAdapter;
//!
//! # async fn example() -> Result<(), tutor::llm::error::LlmError> {
//! let config = GeminiConfig {
//!     api_key: "AIza...".into(),
//!     ..GeminiConfig::default()
//! };
//! let adapter = GeminiAdapter::from_config(&config)?;
//! let reply = adapter
//!     .generate(GenerationRequest {
//!         model: "gemini-2.5-pro",
//!         prompt: "Explain photosynthesis",
//!         image: None,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use super::backend::{GenerationBackend, GenerationRequest};
use super::error::LlmError;
use crate::config::GeminiConfig;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl From<&GeminiConfig> for SamplingOptions {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Build the JSON request body for `generateContent`.
pub fn build_request_body(
    request: &GenerationRequest<'_>,
    sampling: &SamplingOptions,
) -> serde_json::Value {
    let mut parts = vec![serde_json::json!({ "text": request.prompt })];
    if let Some(image) = request.image {
        parts.push(serde_json::json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": image.to_base64(),
            }
        }));
    }

    serde_json::json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "temperature": sampling.temperature,
            "topK": sampling.top_k,
            "topP": sampling.top_p,
            "maxOutputTokens": sampling.max_output_tokens,
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Pull the reply text out of a `generateContent` response body.
///
/// # Errors
///
/// Returns [`LlmError::MalformedResponse`] when the body is not valid JSON,
/// the prompt was blocked, or no candidate carries text.
pub fn parse_reply(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedResponse(format!("invalid JSON: {e}")))?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::MalformedResponse(format!(
            "prompt blocked: {reason}"
        )));
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(LlmError::MalformedResponse("no candidates in response".into()));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(LlmError::MalformedResponse(format!(
            "candidate has no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

/// Gemini HTTP adapter.
pub struct GeminiAdapter {
    api_key: String,
    base_url: String,
    sampling: SamplingOptions,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("base_url", &self.base_url)
            .field("sampling", &self.sampling)
            .finish()
    }
}

impl GeminiAdapter {
    /// Create an adapter from config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError(
                "Gemini API key not found (set GEMINI_API_KEY or gemini.api_key)".into(),
            ));
        }
        Ok(Self {
            api_key: api_key.to_owned(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            sampling: SamplingOptions::from(config),
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Map an HTTP error status to the appropriate [`LlmError`].
    fn map_http_error(status: reqwest::StatusCode, model: &str, body: &str) -> LlmError {
        let message = extract_error_message(body);
        match status.as_u16() {
            400 if message.contains("API key") => {
                LlmError::AuthError(format!("Gemini rejected the API key: {message}"))
            }
            401 | 403 => LlmError::AuthError(format!("Gemini authentication failed: {message}")),
            404 => LlmError::UnsupportedModel(format!("{model}: {message}")),
            429 => LlmError::QuotaError(format!("Gemini quota exceeded: {message}")),
            code => LlmError::ProviderError(format!("Gemini HTTP {code}: {message}")),
        }
    }
}

/// Extract an error message from a Gemini error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl GenerationBackend for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        let body = build_request_body(&request, &self.sampling);

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestError(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::RequestError(format!("Gemini body read failed: {e}")))?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, request.model, &text));
        }
        parse_reply(&text)
    }
}
