use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionRepository};
use crate::routes::with_session_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use univia::catalog::load_catalog;
use univia::config::AppConfig;
use univia::error::AppError;
use univia::session::SessionService;
use univia::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine_config = config.ranking.engine_config()?;
    engine_config.validate()?;

    let (universities, students) = load_catalog(
        &config.catalog.universities_path,
        &config.catalog.students_path,
    )?;
    info!(
        universities = universities.len(),
        students = students.len(),
        seed = config.ranking.seed,
        "catalog loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemorySessionRepository::default());
    let session_service = Arc::new(
        SessionService::new(repository, universities, students, config.ranking.seed)
            .with_engine_config(engine_config),
    );

    let app = with_session_routes(session_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "university matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
