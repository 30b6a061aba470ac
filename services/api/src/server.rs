use crate::cli::ServeArgs;
use crate::infra::{
    default_assignment_config, demo_org, seed_demo_dispatch, seed_demo_marketplace, AppState,
    InMemoryDirectory, InMemoryMarketplace, InMemoryNotificationQueue, InMemoryPriceHistory,
    InMemoryWorkOrders,
};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use fixzit_engine::config::AppConfig;
use fixzit_engine::engines::dispatch::AutoAssignmentEngine;
use fixzit_engine::engines::souq::SouqService;
use fixzit_engine::error::AppError;
use fixzit_engine::telemetry;
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

    let marketplace = Arc::new(InMemoryMarketplace::default());
    let history = Arc::new(InMemoryPriceHistory::default());
    let queue = Arc::new(InMemoryNotificationQueue::default());
    let work_orders = Arc::new(InMemoryWorkOrders::default());
    let directory = Arc::new(InMemoryDirectory::default());

    if args.demo_data {
        let org = demo_org();
        seed_demo_marketplace(&marketplace, &org);
        seed_demo_dispatch(&work_orders, &directory, &org);
        info!(org = %org, "seeded demo marketplace and dispatch data");
    }

    let souq = Arc::new(SouqService::new(marketplace, history, queue));
    let dispatch = Arc::new(AutoAssignmentEngine::new(
        work_orders,
        directory,
        default_assignment_config(),
    ));

    let app = with_engine_routes(souq, dispatch)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fixzit scoring engine service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
