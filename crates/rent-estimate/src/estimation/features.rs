//! Named feature pool and its projection onto a model's expected column order.
//!
//! Every model in the artifact was trained on its own subset and ordering of the columns
//! below, so the assembler fills a name-keyed pool and [`FeatureMap::project`] reads it
//! back in whatever order a model asks for. Names missing from the pool read as zero.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use super::domain::{Coordinate, PredictionRequest};
use super::market::MarketContext;

pub const AREA: &str = "전용면적(㎡)";
pub const FLOOR: &str = "층";
pub const YEAR_BUILT: &str = "건축년도";
pub const LATITUDE: &str = "위도";
pub const LONGITUDE: &str = "경도";
pub const LANDMARK_DISTANCE: &str = "학교거리";
pub const STATION_DISTANCE: &str = "역거리";
pub const BUILDING_AGE: &str = "건물나이";
pub const INTEREST_RATE: &str = "금리";
pub const WEEKLY_VARIATION: &str = "주간변동률";
pub const DEPOSIT: &str = "보증금(만원)";

/// Deposit the monthly-rent models are conditioned on. Fixed by product decision,
/// never taken from the caller.
pub const FIXED_DEPOSIT: f64 = 1000.0;

/// Years since construction; zero for buildings dated in the future.
pub fn building_age(year_built: i32, today: NaiveDate) -> f64 {
    f64::from((today.year() - year_built).max(0))
}

/// Location-derived inputs for one listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFeatures {
    pub coordinate: Coordinate,
    pub landmark_km: f64,
    pub station_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    values: HashMap<&'static str, f64>,
}

impl FeatureMap {
    pub fn assemble(
        request: &PredictionRequest,
        location: LocationFeatures,
        market: MarketContext,
        today: NaiveDate,
    ) -> Self {
        let values = HashMap::from([
            (AREA, request.area),
            (FLOOR, f64::from(request.floor)),
            (YEAR_BUILT, f64::from(request.year_built)),
            (LATITUDE, location.coordinate.latitude),
            (LONGITUDE, location.coordinate.longitude),
            (LANDMARK_DISTANCE, location.landmark_km),
            (STATION_DISTANCE, location.station_km),
            (BUILDING_AGE, building_age(request.year_built, today)),
            (INTEREST_RATE, market.interest_rate),
            (WEEKLY_VARIATION, market.weekly_variation),
            (DEPOSIT, FIXED_DEPOSIT),
        ]);

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn project<S: AsRef<str>>(&self, feature_names: &[S]) -> FeatureVector {
        FeatureVector(
            feature_names
                .iter()
                .map(|name| self.get(name.as_ref()).unwrap_or(0.0))
                .collect(),
        )
    }
}

/// Model-ordered inputs for a single inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
