use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::baseline;
use super::domain::{round2, PredictionRequest, PredictionResult, RentType, RequestValidationError};
use super::features::FIXED_DEPOSIT;
use super::geocoder::Geocoder;
use super::journal::{PredictionLog, PredictionLogEntry};
use super::model::ModelKey;
use super::predictor::{PredictionError, PricePredictor};

/// Which estimator produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Ensemble,
    Formula,
}

impl QuoteSource {
    pub fn label(self) -> &'static str {
        match self {
            QuoteSource::Ensemble => "ensemble",
            QuoteSource::Formula => "formula",
        }
    }
}

/// API-facing answer, all figures in 만원 rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub deposit_pred: f64,
    pub monthly_pred: f64,
    /// Headline figure: the deposit for 전세, the monthly rent for 월세.
    pub estimate: f64,
    pub source: QuoteSource,
}

impl PriceQuote {
    /// Jeonse models predict the deposit; wolse models predict monthly rent at the
    /// fixed deposit they were conditioned on.
    pub fn from_ensemble(rent_type: RentType, result: PredictionResult) -> Self {
        let estimate = result.rounded();
        let (deposit_pred, monthly_pred) = match rent_type {
            RentType::Jeonse => (estimate, 0.0),
            RentType::Wolse => (FIXED_DEPOSIT, estimate),
        };
        Self {
            deposit_pred,
            monthly_pred,
            estimate,
            source: QuoteSource::Ensemble,
        }
    }

    pub fn from_formula(rent_type: RentType, estimate: baseline::FormulaEstimate) -> Self {
        let deposit_pred = round2(estimate.deposit);
        let monthly_pred = round2(estimate.monthly);
        let headline = match rent_type {
            RentType::Jeonse => deposit_pred,
            RentType::Wolse => monthly_pred,
        };
        Self {
            deposit_pred,
            monthly_pred,
            estimate: headline,
            source: QuoteSource::Formula,
        }
    }
}

/// Estimator selected at startup.
pub enum PricingBackend<G: ?Sized> {
    Ensemble(PricePredictor<G>),
    Formula,
}

/// Validates requests, dispatches to the active estimator and journals answers.
pub struct EstimationService<G: ?Sized, L: ?Sized> {
    backend: PricingBackend<G>,
    journal: Arc<L>,
}

impl<G, L> EstimationService<G, L>
where
    G: Geocoder + ?Sized + 'static,
    L: PredictionLog + ?Sized + 'static,
{
    pub fn new(backend: PricingBackend<G>, journal: Arc<L>) -> Self {
        Self { backend, journal }
    }

    pub fn source(&self) -> QuoteSource {
        match self.backend {
            PricingBackend::Ensemble(_) => QuoteSource::Ensemble,
            PricingBackend::Formula => QuoteSource::Formula,
        }
    }

    /// Combinations the ensemble can answer; empty in formula mode.
    pub fn model_keys(&self) -> Vec<ModelKey> {
        match &self.backend {
            PricingBackend::Ensemble(predictor) => predictor.models().keys(),
            PricingBackend::Formula => Vec::new(),
        }
    }

    pub async fn quote(&self, request: PredictionRequest) -> Result<PriceQuote, EstimationError> {
        self.quote_on(request, Local::now().date_naive()).await
    }

    pub async fn quote_on(
        &self,
        request: PredictionRequest,
        today: NaiveDate,
    ) -> Result<PriceQuote, EstimationError> {
        let request = request.validate()?;

        let quote = match &self.backend {
            PricingBackend::Ensemble(predictor) => {
                let result = predictor.estimate_price_on(&request, today).await?;
                PriceQuote::from_ensemble(request.rent_type, result)
            }
            PricingBackend::Formula => {
                PriceQuote::from_formula(request.rent_type, baseline::estimate(&request))
            }
        };

        let entry = PredictionLogEntry {
            request,
            quote: quote.clone(),
            recorded_at: Utc::now(),
        };
        if let Err(err) = self.journal.record(entry) {
            warn!(error = %err, "prediction answered but not journaled");
        }

        Ok(quote)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EstimationError {
    #[error(transparent)]
    InvalidInput(#[from] RequestValidationError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
