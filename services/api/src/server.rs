use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_match::applications::ApplicationService;
use placement_match::config::AppConfig;
use placement_match::error::AppError;
use placement_match::matching::{RankingOptions, RankingService, ScoringEngine};
use placement_match::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(ScoringEngine::new(config.engine.weights));
    let mut options = RankingOptions::default();
    if let Some(max_workers) = config.engine.max_workers {
        options.max_workers = max_workers;
    }
    if config.engine.deadline.is_some() {
        options.deadline = config.engine.deadline;
    }
    let ranking_service = Arc::new(RankingService::with_options(Arc::clone(&engine), options));

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let application_service = Arc::new(ApplicationService::new(repository, engine));

    let app = with_service_routes(ranking_service, application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement match service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
