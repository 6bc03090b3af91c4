use crate::config::ConfigError;
use crate::estimation::router::status_for;
use crate::estimation::{EstimationError, GeocodeError, MarketRateError, ModelTableError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Models(ModelTableError),
    MarketRates(MarketRateError),
    Geocoder(GeocodeError),
    Estimation(EstimationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Models(err) => write!(f, "model table error: {}", err),
            AppError::MarketRates(err) => write!(f, "market rate error: {}", err),
            AppError::Geocoder(err) => write!(f, "geocoder error: {}", err),
            AppError::Estimation(err) => write!(f, "estimation error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Models(err) => Some(err),
            AppError::MarketRates(err) => Some(err),
            AppError::Geocoder(err) => Some(err),
            AppError::Estimation(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Estimation(err) => status_for(err),
            AppError::Geocoder(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Models(_)
            | AppError::MarketRates(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ModelTableError> for AppError {
    fn from(value: ModelTableError) -> Self {
        Self::Models(value)
    }
}

impl From<MarketRateError> for AppError {
    fn from(value: MarketRateError) -> Self {
        Self::MarketRates(value)
    }
}

impl From<GeocodeError> for AppError {
    fn from(value: GeocodeError) -> Self {
        Self::Geocoder(value)
    }
}

impl From<EstimationError> for AppError {
    fn from(value: EstimationError) -> Self {
        Self::Estimation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{HousingType, ModelKey, PredictionError, RentType};

    #[test]
    fn estimation_errors_keep_their_http_status() {
        let missing = AppError::from(EstimationError::Prediction(PredictionError::Geocode(
            GeocodeError::AddressNotFound("nowhere".to_string()),
        )));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let no_model = AppError::from(EstimationError::Prediction(PredictionError::ModelNotFound(
            ModelKey::new(HousingType::Villa, RentType::Wolse),
        )));
        assert_eq!(
            no_model.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn config_errors_are_internal() {
        let err = AppError::from(ConfigError::InvalidPort);
        assert!(err.to_string().starts_with("configuration error"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
