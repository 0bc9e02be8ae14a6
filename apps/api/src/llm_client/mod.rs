/// Gemini client: the single point of entry for all generative-AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All analysis requests MUST go through this module.
///
/// Calls are single-shot: a failed analysis is reported back as an
/// error-shaped result and the user re-triggers manually. There is no
/// automatic retry, backoff or queueing anywhere in this service.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::AnalysisResult;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all analysis calls.
pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response blocked: {0:?}")]
    Blocked(BlockReason),

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Why the model finished without usable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Safety,
    Recitation,
    MaxTokens,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
            .filter(|t| !t.trim().is_empty())
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first().and_then(|c| c.finish_reason.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single Gemini client used by the analysis pipeline. Wraps the
/// generateContent endpoint with inline file data and a structured
/// JSON response schema.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends the creative bytes plus the master prompt and parses the
    /// schema-constrained JSON response into an `AnalysisResult`.
    pub async fn analyze(
        &self,
        creative_bytes: &[u8],
        mime_type: &str,
        prompt: &str,
        response_schema: Value,
    ) -> Result<AnalysisResult, LlmError> {
        let request_body = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(creative_bytes),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            }),
        };

        let text = self.generate(&request_body).await?;
        let text = strip_json_fences(&text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Free-text generation without a response schema. Used for the
    /// performance-insights summary.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: None,
        };
        self.generate(&request_body).await
    }

    async fn generate(&self, request_body: &GeminiRequest<'_>) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {status}: {message}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let text = match gemini_response.text() {
            Some(t) => t,
            None => {
                return Err(match gemini_response.finish_reason() {
                    Some("SAFETY") => LlmError::Blocked(BlockReason::Safety),
                    Some("RECITATION") => LlmError::Blocked(BlockReason::Recitation),
                    Some("MAX_TOKENS") => LlmError::Blocked(BlockReason::MaxTokens),
                    _ => LlmError::EmptyContent,
                });
            }
        };

        debug!("Gemini call succeeded ({} response bytes)", text.len());
        Ok(text.to_string())
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// The schema asks for bare JSON but models occasionally fence it anyway.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = GeminiClient::new(None);
        let err = client
            .analyze(b"bytes", "video/mp4", "prompt", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_text_generation_requires_key() {
        let client = GeminiClient::new(None);
        let err = client.generate_text("why did these work?").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_schemaless_request_omits_generation_config() {
        let request = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![Part::Text { text: "prompt" }],
            }],
            generation_config: None,
        };
        let raw = serde_json::to_string(&request).unwrap();
        assert!(!raw.contains("generationConfig"));
    }

    #[test]
    fn test_finish_reason_mapping() {
        let raw = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.text().is_none());
        assert_eq!(resp.finish_reason(), Some("SAFETY"));
    }
}
