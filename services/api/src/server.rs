use crate::cli::ServeArgs;
use crate::infra::{shared_http_client, AppState, CardServices};
use crate::routes::with_card_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use logos_pay::config::AppConfig;
use logos_pay::error::AppError;
use logos_pay::orders::StarpayClient;
use logos_pay::reputation::EthosClient;
use logos_pay::telemetry;
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

    let http = shared_http_client()?;
    let services = CardServices {
        reputation: Arc::new(EthosClient::new(http.clone(), &config.ethos)),
        starpay: Arc::new(StarpayClient::new(http, &config.starpay)),
    };
    if services.starpay.is_mock() {
        info!("no issuer API key configured; card endpoints serve deterministic mock data");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_card_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "card issuance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
