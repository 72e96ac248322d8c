pub mod api;
pub mod config;
pub mod errors;
pub mod inference;
pub mod metrics;
pub mod models;

use crate::config::AppConfig;
use crate::inference::ScoringService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: ScoringService,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
