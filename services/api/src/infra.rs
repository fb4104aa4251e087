use metrics_exporter_prometheus::PrometheusHandle;
use soulscore::config::ScoringConfig;
use soulscore::error::AppError;
use soulscore::QuizScoringService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seeded catalog plus configured overrides, wrapped for sharing across handlers.
pub(crate) fn load_service(config: &ScoringConfig) -> Result<Arc<QuizScoringService>, AppError> {
    let service = QuizScoringService::from_config(config)?;
    Ok(Arc::new(service))
}
