#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chat_relay::error::RelayError;
use chat_relay::services::backend::Backend;
use chat_relay::services::prompt::PromptTemplate;
use chat_relay::services::relay::Relay;

/// Replies with the prompt it was given.
#[derive(Default)]
pub struct EchoBackend {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Backend for EchoBackend {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers interleave.
        tokio::task::yield_now().await;
        Ok(prompt.to_string())
    }
}

/// Replies with a canned text.
pub struct FixedBackend(pub &'static str);

#[async_trait]
impl Backend for FixedBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, RelayError> {
        Ok(self.0.to_string())
    }
}

/// Always fails with the given error.
pub struct FailingBackend(pub RelayError);

#[async_trait]
impl Backend for FailingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, RelayError> {
        Err(self.0.clone())
    }
}

pub fn relay_with(backend: Arc<dyn Backend>) -> Relay {
    Relay::new(PromptTemplate::default(), backend)
}

pub fn echo_relay() -> (Relay, Arc<EchoBackend>) {
    let backend = Arc::new(EchoBackend::default());
    (relay_with(backend.clone()), backend)
}
