// src/routes/mod.rs
pub mod chat;
pub mod info;

use crate::{error::AppError, state::SharedState};
use axum::{
    Router,
    routing::{get, post},
};
use chat::conversation_handler;
use info::{api_info_handler, get_metrics_handler, health_handler, index_handler};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/conversation", post(conversation_handler))
        .route("/health", get(health_handler))
        .route("/api-info", get(api_info_handler))
        .route("/metrics", get(get_metrics_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::NotFound
}
