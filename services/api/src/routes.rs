use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use rent_estimate::estimation::{estimation_router, EstimationService, Geocoder, PredictionLog};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<G, L>(service: Arc<EstimationService<G, L>>) -> axum::Router
where
    G: Geocoder + ?Sized + 'static,
    L: PredictionLog + ?Sized + 'static,
{
    estimation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/predictions/recent",
            axum::routing::get(recent_predictions_endpoint),
        )
}

/// Upper bound on entries returned by the recent-predictions endpoint.
pub(crate) const RECENT_RESPONSE_LIMIT: usize = 50;

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

pub(crate) async fn recent_predictions_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    match state.journal.recent(RECENT_RESPONSE_LIMIT) {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({ "count": entries.len(), "predictions": entries })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}
