use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::estimation::domain::{Coordinate, HousingType, PredictionRequest, RentType};
use crate::estimation::geocoder::{GeocodeError, Geocoder};
use crate::estimation::journal::{PredictionLog, PredictionLogEntry, PredictionLogError};
use crate::estimation::market::MarketRateTable;
use crate::estimation::model::{ModelEntry, ModelKey, ModelTable, Regressor};
use crate::estimation::predictor::PricePredictor;
use crate::estimation::service::{EstimationService, PricingBackend};

pub(super) const HWAYANG: Coordinate = Coordinate::new(37.5432, 127.0711);

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
}

pub(super) fn request(housing_type: HousingType, rent_type: RentType) -> PredictionRequest {
    PredictionRequest {
        housing_type,
        rent_type,
        address: "서울 광진구 화양동 5-1".to_string(),
        area: 50.0,
        floor: 3,
        year_built: 2015,
    }
}

/// Returns a fixed coordinate and counts calls.
#[derive(Debug)]
pub(super) struct StubGeocoder {
    coordinate: Coordinate,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub(super) fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn locate(&self, _address: &str) -> Result<Coordinate, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.coordinate)
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum GeocoderFailure {
    NotFound,
    Unavailable,
}

#[derive(Debug)]
pub(super) struct FailingGeocoder(pub(super) GeocoderFailure);

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn locate(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        Err(match self.0 {
            GeocoderFailure::NotFound => GeocodeError::AddressNotFound(address.to_string()),
            GeocoderFailure::Unavailable => {
                GeocodeError::Unavailable("connection refused".to_string())
            }
        })
    }
}

#[derive(Debug)]
pub(super) struct Constant(pub(super) f64);

impl Regressor for Constant {
    fn predict(&self, _features: &[f64]) -> f64 {
        self.0
    }
}

/// Records every vector it is asked to score.
#[derive(Debug, Default)]
pub(super) struct Recording {
    seen: Mutex<Vec<Vec<f64>>>,
}

impl Recording {
    pub(super) fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("recording mutex").clone()
    }
}

impl Regressor for Recording {
    fn predict(&self, features: &[f64]) -> f64 {
        self.seen
            .lock()
            .expect("recording mutex")
            .push(features.to_vec());
        0.0
    }
}

pub(super) fn constant_entry(first: f64, second: f64, feature_names: &[&str]) -> ModelEntry {
    ModelEntry::new(
        Arc::new(Constant(first)),
        Arc::new(Constant(second)),
        feature_names.iter().map(|name| name.to_string()).collect(),
    )
}

/// Only (오피스텔, 전세) and (연립다세대, 월세) are provisioned.
pub(super) fn partial_table(first: f64, second: f64) -> ModelTable {
    ModelTable::builder()
        .insert(
            ModelKey::new(HousingType::Officetel, RentType::Jeonse),
            constant_entry(first, second, &["전용면적(㎡)", "층"]),
        )
        .and_then(|builder| {
            builder.insert(
                ModelKey::new(HousingType::Villa, RentType::Wolse),
                constant_entry(first, second, &["보증금(만원)", "층"]),
            )
        })
        .expect("distinct keys")
        .build()
}

pub(super) fn predictor<G: Geocoder + 'static>(
    table: ModelTable,
    geocoder: Arc<G>,
) -> PricePredictor<G> {
    PricePredictor::new(
        Arc::new(table),
        Arc::new(MarketRateTable::built_in()),
        geocoder,
    )
}

#[derive(Debug, Default)]
pub(super) struct MemoryJournal {
    entries: Mutex<Vec<PredictionLogEntry>>,
}

impl MemoryJournal {
    pub(super) fn entries(&self) -> Vec<PredictionLogEntry> {
        self.entries.lock().expect("journal mutex").clone()
    }
}

impl PredictionLog for MemoryJournal {
    fn record(&self, entry: PredictionLogEntry) -> Result<(), PredictionLogError> {
        self.entries.lock().expect("journal mutex").push(entry);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(super) struct BrokenJournal;

impl PredictionLog for BrokenJournal {
    fn record(&self, _entry: PredictionLogEntry) -> Result<(), PredictionLogError> {
        Err(PredictionLogError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn ensemble_service<G: Geocoder + 'static>(
    table: ModelTable,
    geocoder: Arc<G>,
    journal: Arc<MemoryJournal>,
) -> EstimationService<G, MemoryJournal> {
    EstimationService::new(PricingBackend::Ensemble(predictor(table, geocoder)), journal)
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    let value = serde_json::from_slice(&bytes).expect("body is json");
    (status, value)
}
