use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::observation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use observation_report::config::AppConfig;
use observation_report::error::AppError;
use observation_report::telemetry;
use std::sync::atomic::Ordering;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.sources.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState::new(prometheus_handle, config.sources.clone(), config.roles.clone());
    let readiness_flag = app_state.readiness.clone();

    let app = observation_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.sources.data_dir.display(),
        cache_ttl_secs = config.sources.cache_ttl.as_secs(),
        "observation report service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
