use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use super::domain::{PredictionRequest, PredictionResult};
use super::features::{FeatureMap, LocationFeatures};
use super::geo::{landmark_distance_km, nearest_station_km};
use super::geocoder::{GeocodeError, Geocoder};
use super::market::MarketRateTable;
use super::model::{ModelKey, ModelTable};

/// Runs the geocode → features → dual-model pipeline for one listing.
pub struct PricePredictor<G: ?Sized> {
    models: Arc<ModelTable>,
    markets: Arc<MarketRateTable>,
    geocoder: Arc<G>,
}

impl<G: ?Sized> Clone for PricePredictor<G> {
    fn clone(&self) -> Self {
        Self {
            models: self.models.clone(),
            markets: self.markets.clone(),
            geocoder: self.geocoder.clone(),
        }
    }
}

impl<G> PricePredictor<G>
where
    G: Geocoder + ?Sized,
{
    pub fn new(models: Arc<ModelTable>, markets: Arc<MarketRateTable>, geocoder: Arc<G>) -> Self {
        Self {
            models,
            markets,
            geocoder,
        }
    }

    pub fn models(&self) -> &ModelTable {
        &self.models
    }

    /// Estimate in 만원 as of today's date.
    pub async fn estimate_price(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.estimate_price_on(request, Local::now().date_naive())
            .await
    }

    /// Same as [`Self::estimate_price`] with `today` driving building age and the rate month.
    pub async fn estimate_price_on(
        &self,
        request: &PredictionRequest,
        today: NaiveDate,
    ) -> Result<PredictionResult, PredictionError> {
        let key = ModelKey::new(request.housing_type, request.rent_type);
        // Must fail before any network I/O.
        let Some(entry) = self.models.get(key) else {
            error!(%key, loaded = self.models.len(), "no model loaded for requested combination");
            return Err(PredictionError::ModelNotFound(key));
        };

        let coordinate = self.geocoder.locate(&request.address).await?;
        let location = LocationFeatures {
            coordinate,
            landmark_km: landmark_distance_km(coordinate),
            station_km: nearest_station_km(coordinate),
        };
        let market = self.markets.context_for(today);

        let features =
            FeatureMap::assemble(request, location, market, today).project(entry.feature_names());
        let result = PredictionResult::from_raw(entry.ensemble_predict(features.as_slice()));

        info!(
            %key,
            estimate = result.value(),
            station_km = location.station_km,
            interest_rate = market.interest_rate,
            "price estimated"
        );
        Ok(result)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("no model is loaded for {0}")]
    ModelNotFound(ModelKey),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}
