use axum::{Json, extract::State, response::Html};
use serde_json::{Value, json};

use crate::services::metrics_manager::MetricsData;
use crate::state::SharedState;

pub const SERVICE_NAME: &str = "AI Chat Service";

const INDEX_HTML: &str = include_str!("../../public/index.html");

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

pub async fn api_info_handler() -> Json<Value> {
    Json(json!({
        "message": "AI Chat Service API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/conversation",
            "health": "/health",
            "metrics": "/metrics",
            "web_interface": "/"
        }
    }))
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
