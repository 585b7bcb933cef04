// src/server.rs
use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{ConfigError, RelayError};
use crate::routes;
use crate::services::backend::GeminiClient;
use crate::services::prompt::PromptTemplate;
use crate::services::relay::Relay;
use crate::state::{AppState, SharedState};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Resolves the template and credential once. A missing API key stops here.
pub fn build_relay(config: &AppConfig) -> Result<Relay, StartupError> {
    let template = match &config.prompt_template {
        Some(text) => PromptTemplate::parse(text).map_err(ConfigError::from)?,
        None => PromptTemplate::default(),
    };
    let backend = GeminiClient::new(&config.backend)?;
    info!(model = backend.model(), "gemini backend ready");
    Ok(Relay::new(template, Arc::new(backend)))
}

pub fn build_app(state: SharedState) -> Router {
    routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive())
}

pub async fn serve<F>(listener: TcpListener, relay: Relay, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(AppState::shared(relay));
    info!(addr = %listener.local_addr()?, "chat server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::error::TemplateError;

    #[test]
    fn missing_key_stops_startup() {
        let err = build_relay(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, StartupError::Relay(RelayError::MissingCredential)));
    }

    #[test]
    fn bad_template_override_stops_startup() {
        let config = AppConfig {
            backend: BackendConfig::new("key"),
            prompt_template: Some("{user_message} before {background_context}".to_string()),
            ..AppConfig::default()
        };
        let err = build_relay(&config).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Config(ConfigError::Template(TemplateError::SlotOrder))
        ));
    }

    #[test]
    fn valid_key_and_template_build_a_relay() {
        let config = AppConfig {
            backend: BackendConfig::new("key"),
            prompt_template: Some("{background_context} Q: {user_message}".to_string()),
            ..AppConfig::default()
        };
        assert!(build_relay(&config).is_ok());
    }
}
