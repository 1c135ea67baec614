use crate::cli::ServeArgs;
use crate::infra::{open_stores, AppState, InMemoryPhotoStore};
use crate::routes::with_job_board_routes;
use crate::shutdown::install_shutdown_handler;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use job_board::workflows::applications::{
    ApplicationService, FormEngine, PhotoPolicy, RendererRegistry,
};
use job_board::workflows::candidates::CandidateService;
use job_board::workflows::jobs::JobService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
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

    let shutdown = CancellationToken::new();
    install_shutdown_handler(shutdown.clone())?;

    let stores = open_stores(&config.storage).await?;
    let engine = FormEngine::new(
        RendererRegistry::with_photo_limit(config.photos.max_bytes),
        PhotoPolicy::new(config.photos.max_bytes),
    );

    let job_service = Arc::new(JobService::new(stores.jobs.clone()));
    let application_service = Arc::new(
        ApplicationService::new(
            stores.jobs.clone(),
            stores.candidates.clone(),
            Arc::new(InMemoryPhotoStore::default()),
            engine,
        )
        .with_shutdown(shutdown.clone()),
    );
    let candidate_service = Arc::new(
        CandidateService::new(stores.candidates.clone()).with_page_size(config.grid.page_size),
    );

    let app = with_job_board_routes(job_service, application_service, candidate_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board api ready");

    let draining = readiness_flag.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            draining.store(false, Ordering::Release);
        })
        .await?;

    info!("job board api stopped");
    Ok(())
}
