// src/state.rs
use std::sync::Arc;

use crate::services::metrics_manager::MetricsManager;
use crate::services::relay::Relay;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub relay: Relay,
    pub metrics: MetricsManager,
}

impl AppState {
    /// Attaches a fresh metrics manager to `relay`.
    pub fn new(relay: Relay) -> Self {
        let metrics = MetricsManager::new();
        Self {
            relay: relay.with_metrics(metrics.clone()),
            metrics,
        }
    }

    pub fn shared(relay: Relay) -> SharedState {
        Arc::new(Self::new(relay))
    }
}
