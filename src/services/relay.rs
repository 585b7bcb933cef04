// src/services/relay.rs
use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::backend::Backend;
use super::metrics_manager::{MetricsManager, SUCCESS};
use super::prompt::PromptTemplate;
use crate::error::RelayError;
use crate::message::{ChatReply, ChatRequest};

/// Turns a [`ChatRequest`] into a [`ChatReply`].
///
/// Holds no per-call state; clones share the template and backend.
#[derive(Clone)]
pub struct Relay {
    template: Arc<PromptTemplate>,
    backend: Arc<dyn Backend>,
    metrics: Option<MetricsManager>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("template", &self.template)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl Relay {
    pub fn new(template: PromptTemplate, backend: Arc<dyn Backend>) -> Self {
        Self {
            template: Arc::new(template),
            backend,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsManager) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Never fails: every error ends up in `ChatReply::error`.
    pub async fn respond(&self, request: ChatRequest) -> ChatReply {
        let span = info_span!("relay", request_id = %Uuid::new_v4());
        async move {
            let reply = match self.generate(&request).await {
                Ok((text, latency_ms)) => {
                    info!(latency_ms, reply_len = text.len(), "reply generated");
                    ChatReply::success(text, Some(latency_ms))
                }
                Err(err) => {
                    warn!(kind = err.kind(), error = %err, "relay failed");
                    ChatReply::failure(&err)
                }
            };

            if let Some(metrics) = &self.metrics {
                let outcome = reply.error().map_or(SUCCESS, |e| e.kind.as_str());
                metrics.record_outcome(outcome).await;
                if let Some(latency_ms) = reply.backend_latency_ms() {
                    metrics.record_backend_latency(latency_ms).await;
                }
            }
            reply
        }
        .instrument(span)
        .await
    }

    async fn generate(&self, request: &ChatRequest) -> Result<(String, u64), RelayError> {
        let prompt = self
            .template
            .compose(&request.message, &request.background_context)?;

        let started = Instant::now();
        let text = self.backend.generate(&prompt).await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok((text, latency_ms))
    }
}
