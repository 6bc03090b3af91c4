use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rent_estimate::config::{AppConfig, PricingMode};
use rent_estimate::error::AppError;
use rent_estimate::estimation::{
    EstimationService, KakaoGeocoder, MarketRateTable, ModelTable, PredictionLog,
    PredictionLogEntry, PredictionLogError, PricePredictor, PricingBackend, TracingPredictionLog,
};
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

/// How many answered predictions the in-memory journal keeps.
pub(crate) const RECENT_PREDICTION_CAPACITY: usize = 256;

pub(crate) type AppEstimationService = EstimationService<KakaoGeocoder, InMemoryPredictionLog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) journal: Arc<InMemoryPredictionLog>,
}

/// Keeps the most recent predictions in memory and mirrors each one to the log.
#[derive(Clone)]
pub(crate) struct InMemoryPredictionLog {
    entries: Arc<Mutex<VecDeque<PredictionLogEntry>>>,
    capacity: usize,
}

impl Default for InMemoryPredictionLog {
    fn default() -> Self {
        Self::with_capacity(RECENT_PREDICTION_CAPACITY)
    }
}

impl InMemoryPredictionLog {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Newest first, at most `limit` entries.
    pub(crate) fn recent(
        &self,
        limit: usize,
    ) -> Result<Vec<PredictionLogEntry>, PredictionLogError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| PredictionLogError::Unavailable("journal mutex poisoned".to_string()))?;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

impl PredictionLog for InMemoryPredictionLog {
    fn record(&self, entry: PredictionLogEntry) -> Result<(), PredictionLogError> {
        TracingPredictionLog.record(entry.clone())?;

        let mut guard = self
            .entries
            .lock()
            .map_err(|_| PredictionLogError::Unavailable("journal mutex poisoned".to_string()))?;
        if self.capacity == 0 {
            return Ok(());
        }
        while guard.len() >= self.capacity {
            guard.pop_front();
        }
        guard.push_back(entry);
        Ok(())
    }
}

/// Wires the configured estimator. Artifact and rate-file problems abort startup.
pub(crate) fn build_estimation_service(
    config: &AppConfig,
    journal: Arc<InMemoryPredictionLog>,
) -> Result<AppEstimationService, AppError> {
    let backend = match config.estimation.pricing_mode {
        PricingMode::Formula => {
            info!("pricing with the placeholder formula");
            PricingBackend::Formula
        }
        PricingMode::Model => {
            let models = ModelTable::from_path(&config.estimation.model_path)?;
            let markets = match &config.estimation.market_rates_csv {
                Some(path) => {
                    let table = MarketRateTable::from_csv_path(path)?;
                    info!(path = %path.display(), months = table.len(), "market rates loaded");
                    table
                }
                None => MarketRateTable::built_in(),
            };
            let geocoder = KakaoGeocoder::new(&config.geocoder)?;
            PricingBackend::Ensemble(PricePredictor::new(
                Arc::new(models),
                Arc::new(markets),
                Arc::new(geocoder),
            ))
        }
    };

    Ok(EstimationService::new(backend, journal))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rent_estimate::estimation::{
        HousingType, PredictionRequest, PredictionResult, PriceQuote, RentType,
    };

    fn entry(estimate: f64) -> PredictionLogEntry {
        PredictionLogEntry {
            request: PredictionRequest {
                housing_type: HousingType::Officetel,
                rent_type: RentType::Wolse,
                address: "서울 광진구 자양동 7-3".to_string(),
                area: 24.0,
                floor: 5,
                year_built: 2019,
            },
            quote: PriceQuote::from_ensemble(RentType::Wolse, PredictionResult::from_raw(estimate)),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn journal_keeps_only_the_newest_entries() {
        let journal = InMemoryPredictionLog::with_capacity(2);
        for estimate in [51.0, 52.0, 53.0] {
            journal.record(entry(estimate)).expect("record succeeds");
        }

        let kept: Vec<f64> = journal
            .recent(RECENT_PREDICTION_CAPACITY)
            .expect("journal readable")
            .iter()
            .map(|entry| entry.quote.monthly_pred)
            .collect();
        assert_eq!(kept, vec![53.0, 52.0]);
    }

    #[test]
    fn zero_capacity_journal_stores_nothing() {
        let journal = InMemoryPredictionLog::with_capacity(0);
        journal.record(entry(40.0)).expect("record succeeds");
        assert!(journal.recent(10).expect("journal readable").is_empty());
    }

    #[test]
    fn recent_honours_the_limit() {
        let journal = InMemoryPredictionLog::default();
        for estimate in [61.0, 62.0, 63.0] {
            journal.record(entry(estimate)).expect("record succeeds");
        }

        let newest = journal.recent(1).expect("journal readable");
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].quote.monthly_pred, 63.0);
        assert!(journal.recent(0).expect("journal readable").is_empty());
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-03-10 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"))
        );
        assert!(parse_date("10/03/2025").is_err());
    }
}
