use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{Fsin, SellerId};
use super::feed::FeedImportError;
use super::repository::{MarketplaceRepository, NotificationQueue, PriceHistorySink};
use super::repricer::RepricerError;
use super::SouqService;
use crate::tenancy::OrgId;

/// Router builder exposing HTTP endpoints for the marketplace engines.
pub fn souq_router<R, H, Q>(service: Arc<SouqService<R, H, Q>>) -> Router
where
    R: MarketplaceRepository + 'static,
    H: PriceHistorySink + 'static,
    Q: NotificationQueue + 'static,
{
    Router::new()
        .route(
            "/api/v1/souq/:org/buybox/:fsin",
            get(buybox_handler::<R, H, Q>),
        )
        .route(
            "/api/v1/souq/:org/repricer/run",
            post(reprice_handler::<R, H, Q>),
        )
        .route(
            "/api/v1/souq/:org/sellers/:seller_id/feed",
            post(feed_handler::<R, H, Q>),
        )
        .with_state(service)
}

fn invalid_tenant(error: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

pub(crate) async fn buybox_handler<R, H, Q>(
    State(service): State<Arc<SouqService<R, H, Q>>>,
    Path((org, fsin)): Path<(String, String)>,
) -> Response
where
    R: MarketplaceRepository + 'static,
    H: PriceHistorySink + 'static,
    Q: NotificationQueue + 'static,
{
    let org = match OrgId::new(org) {
        Ok(org) => org,
        Err(err) => return invalid_tenant(err),
    };

    match service.buybox().decide_at(&org, &Fsin(fsin), Utc::now()) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepriceRequest {
    #[serde(default)]
    pub(crate) seller_id: Option<String>,
}

pub(crate) async fn reprice_handler<R, H, Q>(
    State(service): State<Arc<SouqService<R, H, Q>>>,
    Path(org): Path<String>,
    axum::Json(request): axum::Json<RepriceRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
    H: PriceHistorySink + 'static,
    Q: NotificationQueue + 'static,
{
    let org = match OrgId::new(org) {
        Ok(org) => org,
        Err(err) => return invalid_tenant(err),
    };

    let outcome = match request.seller_id {
        Some(seller_id) => service
            .repricer()
            .reprice_seller(&org, &SellerId(seller_id)),
        None => service.repricer().reprice_all_sellers(&org),
    };

    match outcome {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(RepricerError::SellerNotFound(seller)) => {
            let payload = json!({ "error": format!("seller {} not found", seller.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedRequest {
    pub(crate) csv: String,
}

pub(crate) async fn feed_handler<R, H, Q>(
    State(service): State<Arc<SouqService<R, H, Q>>>,
    Path((org, seller_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<FeedRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
    H: PriceHistorySink + 'static,
    Q: NotificationQueue + 'static,
{
    let org = match OrgId::new(org) {
        Ok(org) => org,
        Err(err) => return invalid_tenant(err),
    };

    let reader = Cursor::new(request.csv.into_bytes());
    match service
        .feed()
        .apply_from_reader(&org, &SellerId(seller_id), reader, Utc::now())
    {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(FeedImportError::SellerNotFound(seller)) => {
            let payload = json!({ "error": format!("seller {} not found", seller.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err @ FeedImportError::Csv(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
