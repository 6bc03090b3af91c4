use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::PredictionRequest;
use super::geocoder::{GeocodeError, Geocoder};
use super::journal::PredictionLog;
use super::model::ModelKey;
use super::predictor::PredictionError;
use super::service::{EstimationError, EstimationService};

/// Router builder exposing the prediction endpoints.
pub fn estimation_router<G, L>(service: Arc<EstimationService<G, L>>) -> Router
where
    G: Geocoder + ?Sized + 'static,
    L: PredictionLog + ?Sized + 'static,
{
    Router::new()
        .route("/predict", post(predict_handler::<G, L>))
        .route("/api/v1/models", get(models_handler::<G, L>))
        .with_state(service)
}

pub(crate) async fn predict_handler<G, L>(
    State(service): State<Arc<EstimationService<G, L>>>,
    payload: Result<axum::Json<PredictionRequest>, JsonRejection>,
) -> Response
where
    G: Geocoder + ?Sized + 'static,
    L: PredictionLog + ?Sized + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    match service.quote(request).await {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Serialize)]
struct ModelListing {
    source: &'static str,
    models: Vec<ModelKey>,
}

pub(crate) async fn models_handler<G, L>(
    State(service): State<Arc<EstimationService<G, L>>>,
) -> Response
where
    G: Geocoder + ?Sized + 'static,
    L: PredictionLog + ?Sized + 'static,
{
    let listing = ModelListing {
        source: service.source().label(),
        models: service.model_keys(),
    };
    (StatusCode::OK, axum::Json(listing)).into_response()
}

pub(crate) fn status_for(error: &EstimationError) -> StatusCode {
    match error {
        EstimationError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EstimationError::Prediction(PredictionError::Geocode(GeocodeError::AddressNotFound(
            _,
        ))) => StatusCode::NOT_FOUND,
        EstimationError::Prediction(PredictionError::Geocode(GeocodeError::Unavailable(_))) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EstimationError::Prediction(PredictionError::ModelNotFound(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Unknown housing or rent types, missing fields and wrong types are input errors too.
fn rejection_response(rejection: &JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

fn error_response(error: &EstimationError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(error), axum::Json(payload)).into_response()
}
