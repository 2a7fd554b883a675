//! Application State
//!
//! Shared state across all handlers. Provider clients live inside the
//! orchestrator and are built once at startup.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use voice_turn_agent::TurnOrchestrator;
use voice_turn_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub orchestrator: Arc<TurnOrchestrator>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, orchestrator: TurnOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
