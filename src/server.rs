use crate::cli::ServeArgs;
use crate::routes::{with_operational_routes, AppState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use daily_bill::billing::{billing_router, BillingSession, FileSnapshot, JsonFileStore, TextBillRenderer};
use daily_bill::config::AppConfig;
use daily_bill::error::AppError;
use daily_bill::telemetry::{self, LogSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(JsonFileStore::new(&config.billing.data_dir));
    let snapshot = FileSnapshot::new(&config.billing.snapshot_path);
    let session = BillingSession::bootstrap(store, &snapshot, config.billing.settings_key.clone());
    info!(
        records = session.directory().len(),
        status = ?session.snapshot_status(),
        mirror = %config.billing.data_dir.display(),
        "billing session ready"
    );

    let app = with_operational_routes(billing_router(
        Arc::new(Mutex::new(session)),
        Arc::new(TextBillRenderer),
    ))
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "daily bill service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
