use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecommendationRepository, InMemorySurveyStore};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use youth_policy::config::AppConfig;
use youth_policy::error::AppError;
use youth_policy::recommendation::{RecommendationService, ReferenceCatalog};
use youth_policy::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.recommendation.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = ReferenceCatalog::from_dir(&config.recommendation.data_dir)?;
    info!(
        data_dir = %config.recommendation.data_dir.display(),
        policies = catalog.policies().len(),
        regions = catalog.infra_profiles().len(),
        "reference tables loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let surveys = InMemorySurveyStore::default();
    let repository = Arc::new(InMemoryRecommendationRepository::default());
    let recommendation_service = Arc::new(RecommendationService::new(
        Arc::new(surveys.clone()),
        repository,
        Arc::new(catalog),
        &config.recommendation,
    ));

    let app = with_recommendation_routes(recommendation_service)
        .layer(Extension(surveys))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rerun = config.recommendation.rerun_policy.label(),
        "youth policy recommender ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
