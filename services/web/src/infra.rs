use credit_risk::config::ArtifactConfig;
use credit_risk::error::AppError;
use credit_risk::risk::{ArtifactPaths, Artifacts, RiskPredictor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::ArtifactArgs;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) predictor: Arc<RiskPredictor>,
}

/// Command-line directory wins over the configured one.
pub(crate) fn artifact_directory(args: ArtifactArgs, config: &ArtifactConfig) -> PathBuf {
    args.directory.unwrap_or_else(|| config.directory.clone())
}

pub(crate) fn load_predictor(directory: PathBuf) -> Result<Arc<RiskPredictor>, AppError> {
    let artifacts = Artifacts::load(&ArtifactPaths::new(directory))?;
    Ok(Arc::new(RiskPredictor::new(Arc::new(artifacts))))
}
