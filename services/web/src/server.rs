use crate::cli::ServeArgs;
use crate::infra::{artifact_directory, load_predictor, AppState};
use crate::routes::with_page_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    config.artifacts.directory = artifact_directory(args.artifacts, &config.artifacts);

    telemetry::init(&config.telemetry)?;

    // Artifacts are loaded before binding; a broken artifact set never starts serving.
    let predictor = load_predictor(config.artifacts.directory.clone())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        predictor: predictor.clone(),
    };

    let app = with_page_routes(predictor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        artifacts = %config.artifacts.directory.display(),
        "credit risk form ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
