use crate::infra::{
    AppState, InMemoryDirectory, InMemoryMarketplace, InMemoryNotificationQueue,
    InMemoryPriceHistory, InMemoryWorkOrders,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use fixzit_engine::engines::dispatch::{dispatch_router, AutoAssignmentEngine};
use fixzit_engine::engines::souq::{souq_router, SouqService};

pub(crate) type MarketplaceService =
    SouqService<InMemoryMarketplace, InMemoryPriceHistory, InMemoryNotificationQueue>;
pub(crate) type DispatchEngine = AutoAssignmentEngine<InMemoryWorkOrders, InMemoryDirectory>;

pub(crate) fn with_engine_routes(
    souq: Arc<MarketplaceService>,
    dispatch: Arc<DispatchEngine>,
) -> axum::Router {
    souq_router(souq)
        .merge(dispatch_router(dispatch))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
