//! Rent and price estimation for Gwangjin-gu listings.
//!
//! A request is priced by geocoding its address, measuring distances to Konkuk
//! University and the nearest subway station, attaching the month's base rate, and
//! averaging two trained regressors selected by housing and rent type.

pub mod baseline;
pub mod domain;
pub mod features;
pub mod geo;
pub mod geocoder;
pub mod journal;
pub mod market;
pub mod model;
pub mod predictor;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Coordinate, HousingType, PredictionRequest, PredictionResult, RentType,
    RequestValidationError,
};
pub use features::{FeatureMap, FeatureVector, FIXED_DEPOSIT};
pub use geocoder::{GeocodeError, Geocoder, KakaoGeocoder};
pub use journal::{PredictionLog, PredictionLogEntry, PredictionLogError, TracingPredictionLog};
pub use market::{MarketContext, MarketRateError, MarketRateTable};
pub use model::{
    LinearRegressor, ModelEntry, ModelKey, ModelTable, ModelTableError, Regressor, TreeEnsemble,
};
pub use predictor::{PredictionError, PricePredictor};
pub use router::estimation_router;
pub use service::{EstimationError, EstimationService, PriceQuote, PricingBackend, QuoteSource};
