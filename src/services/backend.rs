// src/services/backend.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::RelayError;

/// A generative-text service that turns one prompt into one reply.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    /// Fails with `MissingCredential` when no API key is configured.
    pub fn new(config: &BackendConfig) -> Result<Self, RelayError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(RelayError::MissingCredential)?
            .to_string();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            url,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Backend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling gemini");

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::BackendUnavailable(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            warn!(status = status.as_u16(), "gemini rejected request");
            return Err(RelayError::BackendError {
                status: Some(status.as_u16()),
                message,
            });
        }

        extract_reply(&text)
    }
}

/// Pulls the reply text out of a `generateContent` response body.
fn extract_reply(body: &str) -> Result<String, RelayError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| RelayError::BackendError {
            status: None,
            message: e.to_string(),
        })?;

    let reply: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if reply.is_empty() {
        return Err(RelayError::BackendError {
            status: None,
            message: "response contained no text".to_string(),
        });
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_generate_content_shape() {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"AI "},{"text":"is..."}],"role":"model"}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(extract_reply(body).unwrap(), "AI is...");
    }

    #[test]
    fn empty_or_malformed_bodies_fail_closed() {
        for body in [r#"{"candidates":[]}"#, r#"{}"#, r#"{"candidates":[{}]}"#, "not json"] {
            let err = extract_reply(body).unwrap_err();
            assert_eq!(err.kind(), "BackendError", "body: {body}");
        }
    }

    #[test]
    fn missing_key_is_rejected_at_construction() {
        let err = GeminiClient::new(&BackendConfig::default()).unwrap_err();
        assert_eq!(err, RelayError::MissingCredential);

        let mut config = BackendConfig::new("  ");
        config.model = "m".into();
        assert_eq!(GeminiClient::new(&config).unwrap_err(), RelayError::MissingCredential);
    }

    #[test]
    fn builds_model_url_from_base() {
        let mut config = BackendConfig::new("key");
        config.base_url = "http://localhost:9999/".into();
        config.model = "gemini-test".into();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.url,
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }
}
