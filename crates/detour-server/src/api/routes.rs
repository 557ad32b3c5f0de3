use crate::error::PlanError;
use crate::route_planner::{plan_route, CancelToken, RoutePlanRequest, RoutePlanResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::request_id::{tag_request, RequestId};

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/routes/plan", post(plan_route_handler))
        .layer(middleware::from_fn(tag_request))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "provider_configured": state.provider().has_api_key(),
        "plans_served": state.plans_served(),
    }))
}

async fn plan_route_handler(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RoutePlanRequest>, JsonRejection>,
) -> Result<Json<RoutePlanResponse>, PlanError> {
    let Json(request) =
        payload.map_err(|rejection| PlanError::InvalidRequest(rejection.body_text()))?;
    let response = plan_route(
        state.provider(),
        state.config(),
        request,
        CancelToken::new(),
    )
    .await?;
    let served = state.record_plan();
    tracing::info!(
        "Plan {} ({}) finished with status {:?} after {} iterations",
        served,
        request_id,
        response.status,
        response.iterations
    );
    Ok(Json(response))
}

pub(crate) fn status_for(err: &PlanError) -> StatusCode {
    match err {
        PlanError::Geometry(_) | PlanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PlanError::ProviderStatus { .. } | PlanError::ProviderPayload(_) => StatusCode::BAD_GATEWAY,
        PlanError::ProviderUnavailable(_) => StatusCode::GATEWAY_TIMEOUT,
        PlanError::MissingApiKey | PlanError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::warn!("Route planning failed: {}", self);
        }
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let PlanError::ProviderStatus { status, .. } = &self {
            body["provider_status"] = json!(status);
        }
        (status, Json(body)).into_response()
    }
}
