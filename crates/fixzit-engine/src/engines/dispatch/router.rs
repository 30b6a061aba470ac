use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::WorkOrderId;
use super::repository::{CandidateDirectory, WorkOrderRepository};
use super::{AssignmentError, AutoAssignmentEngine};
use crate::tenancy::OrgId;

/// Router builder exposing HTTP endpoints for work-order dispatch.
pub fn dispatch_router<W, D>(engine: Arc<AutoAssignmentEngine<W, D>>) -> Router
where
    W: WorkOrderRepository + 'static,
    D: CandidateDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/dispatch/:org/work-orders/:work_order_id",
            get(work_order_handler::<W, D>),
        )
        .route(
            "/api/v1/dispatch/:org/work-orders/:work_order_id/auto-assign",
            post(auto_assign_handler::<W, D>),
        )
        .with_state(engine)
}

fn invalid_tenant(error: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

pub(crate) async fn work_order_handler<W, D>(
    State(engine): State<Arc<AutoAssignmentEngine<W, D>>>,
    Path((org, work_order_id)): Path<(String, String)>,
) -> Response
where
    W: WorkOrderRepository + 'static,
    D: CandidateDirectory + 'static,
{
    let org = match OrgId::new(org) {
        Ok(org) => org,
        Err(err) => return invalid_tenant(err),
    };
    let id = WorkOrderId(work_order_id);

    match engine.work_orders().work_order(&org, &id) {
        Ok(Some(work_order)) => (StatusCode::OK, axum::Json(work_order)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": format!("work order {} not found", id.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn auto_assign_handler<W, D>(
    State(engine): State<Arc<AutoAssignmentEngine<W, D>>>,
    Path((org, work_order_id)): Path<(String, String)>,
) -> Response
where
    W: WorkOrderRepository + 'static,
    D: CandidateDirectory + 'static,
{
    let org = match OrgId::new(org) {
        Ok(org) => org,
        Err(err) => return invalid_tenant(err),
    };

    match engine.auto_assign(&org, &WorkOrderId(work_order_id)) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err @ AssignmentError::WorkOrderNotFound(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err @ AssignmentError::AlreadyAssigned(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(err @ AssignmentError::OutsideBusinessHours)
        | Err(err @ AssignmentError::NoEligibleCandidates(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
