use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::PredictionRequest;
use super::service::PriceQuote;

/// One successfully answered prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionLogEntry {
    pub request: PredictionRequest,
    pub quote: PriceQuote,
    pub recorded_at: DateTime<Utc>,
}

/// Sink for answered predictions (e.g. a relational log table).
pub trait PredictionLog: Send + Sync {
    fn record(&self, entry: PredictionLogEntry) -> Result<(), PredictionLogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionLogError {
    #[error("prediction log unavailable: {0}")]
    Unavailable(String),
}

/// Writes each entry as a structured `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPredictionLog;

impl PredictionLog for TracingPredictionLog {
    fn record(&self, entry: PredictionLogEntry) -> Result<(), PredictionLogError> {
        info!(
            housing_type = %entry.request.housing_type,
            rent_type = %entry.request.rent_type,
            area = entry.request.area,
            floor = entry.request.floor,
            year_built = entry.request.year_built,
            deposit_pred = entry.quote.deposit_pred,
            monthly_pred = entry.quote.monthly_pred,
            source = entry.quote.source.label(),
            recorded_at = %entry.recorded_at,
            "prediction recorded"
        );
        Ok(())
    }
}
