// src/services/api_client.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::message::{ChatReply, ChatResponse, ReplyError};

#[derive(Serialize)]
struct ConversationBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    background_context: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ReplyError,
}

/// HTTP client for a running chat server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts to `/conversation`. Server and transport failures come back as `ChatReply::error`.
    pub async fn send_message(&self, message: &str, context: &str) -> ChatReply {
        let url = format!("{}/conversation", self.base_url);
        let body = ConversationBody {
            message,
            background_context: context,
        };

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return ChatReply::failure(transport_error(e)),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ChatReply::failure(transport_error(e)),
        };

        if status.is_success() {
            return match serde_json::from_slice::<ChatResponse>(&bytes) {
                Ok(ok) => ChatReply::success(ok.reply, None),
                Err(e) => ChatReply::failure(ReplyError {
                    kind: "BackendError".to_string(),
                    message: format!("unexpected response from server: {e}"),
                }),
            };
        }

        match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
            Ok(envelope) => ChatReply::failure(envelope.error),
            Err(_) => ChatReply::failure(ReplyError {
                kind: "BackendError".to_string(),
                message: format!("{status}: {}", String::from_utf8_lossy(&bytes)),
            }),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        matches!(self.http.get(&url).send().await, Ok(r) if r.status().is_success())
    }

    /// Polls `/health` until it answers or `timeout` elapses.
    pub async fn wait_until_healthy(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_healthy().await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            debug!(url = %self.base_url, "server not ready yet");
            sleep(Duration::from_millis(100)).await;
        }
    }
}

fn transport_error(e: reqwest::Error) -> ReplyError {
    ReplyError {
        kind: "BackendUnavailable".to_string(),
        message: e.to_string(),
    }
}
