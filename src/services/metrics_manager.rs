use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SUCCESS: &str = "Success";

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    /// Relay calls by outcome: `Success` or an error kind.
    pub outcomes: HashMap<String, u64>,
    pub backend_calls: u64,
    pub backend_latency_ms_total: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record_outcome(&self, outcome: &str) {
        let mut data = self.inner.write().await;
        *data.outcomes.entry(outcome.to_string()).or_insert(0) += 1;
    }

    pub async fn record_backend_latency(&self, latency_ms: u64) {
        let mut data = self.inner.write().await;
        data.backend_calls += 1;
        data.backend_latency_ms_total += latency_ms;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
