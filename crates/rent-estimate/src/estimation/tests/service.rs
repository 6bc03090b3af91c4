use super::common::*;
use std::sync::Arc;

use crate::estimation::domain::{HousingType, PredictionRequest, RentType, RequestValidationError};
use crate::estimation::geocoder::GeocodeError;
use crate::estimation::model::ModelKey;
use crate::estimation::predictor::PredictionError;
use crate::estimation::service::{
    EstimationError, EstimationService, PriceQuote, PricingBackend, QuoteSource,
};

#[tokio::test]
async fn jeonse_quote_puts_estimate_in_deposit() {
    let journal = Arc::new(MemoryJournal::default());
    let service = ensemble_service(
        partial_table(12000.0, 13000.0),
        Arc::new(StubGeocoder::at(HWAYANG)),
        journal.clone(),
    );

    let quote = service
        .quote_on(request(HousingType::Officetel, RentType::Jeonse), today())
        .await
        .expect("quote succeeds");

    assert_eq!(
        quote,
        PriceQuote {
            deposit_pred: 12500.0,
            monthly_pred: 0.0,
            estimate: 12500.0,
            source: QuoteSource::Ensemble,
        }
    );
    assert_eq!(journal.entries().len(), 1);
}

#[tokio::test]
async fn wolse_quote_reports_fixed_deposit() {
    let service = ensemble_service(
        partial_table(61.234, 62.0),
        Arc::new(StubGeocoder::at(HWAYANG)),
        Arc::new(MemoryJournal::default()),
    );

    let quote = service
        .quote_on(request(HousingType::Villa, RentType::Wolse), today())
        .await
        .expect("quote succeeds");

    assert_eq!(quote.deposit_pred, 1000.0);
    assert_eq!(quote.monthly_pred, 61.62);
    assert_eq!(quote.estimate, 61.62);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_geocoder() {
    let geocoder = Arc::new(StubGeocoder::at(HWAYANG));
    let journal = Arc::new(MemoryJournal::default());
    let service = ensemble_service(partial_table(1.0, 1.0), geocoder.clone(), journal.clone());

    let negative_area = PredictionRequest {
        area: -3.0,
        ..request(HousingType::Officetel, RentType::Jeonse)
    };
    let err = service
        .quote_on(negative_area, today())
        .await
        .expect_err("area must be positive");

    assert!(matches!(
        err,
        EstimationError::InvalidInput(RequestValidationError::NonPositiveArea(_))
    ));
    assert_eq!(geocoder.calls(), 0);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn journal_records_the_trimmed_request() {
    let journal = Arc::new(MemoryJournal::default());
    let service = ensemble_service(
        partial_table(10.0, 20.0),
        Arc::new(StubGeocoder::at(HWAYANG)),
        journal.clone(),
    );

    let padded = PredictionRequest {
        address: "   서울 광진구 화양동 5-1\t".to_string(),
        ..request(HousingType::Officetel, RentType::Jeonse)
    };
    let quote = service.quote_on(padded, today()).await.expect("quote succeeds");

    let entries = journal.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].request.address, "서울 광진구 화양동 5-1");
    assert_eq!(entries[0].quote, quote);
}

#[tokio::test]
async fn failed_predictions_are_not_journaled() {
    let journal = Arc::new(MemoryJournal::default());
    let service = EstimationService::new(
        PricingBackend::Ensemble(predictor(
            partial_table(1.0, 1.0),
            Arc::new(FailingGeocoder(GeocoderFailure::NotFound)),
        )),
        journal.clone(),
    );

    let err = service
        .quote_on(request(HousingType::Officetel, RentType::Jeonse), today())
        .await
        .expect_err("address cannot be resolved");

    assert!(matches!(
        err,
        EstimationError::Prediction(PredictionError::Geocode(GeocodeError::AddressNotFound(_)))
    ));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn journal_outage_does_not_fail_the_quote() {
    let service = EstimationService::new(
        PricingBackend::Ensemble(predictor(
            partial_table(100.0, 200.0),
            Arc::new(StubGeocoder::at(HWAYANG)),
        )),
        Arc::new(BrokenJournal),
    );

    let quote = service
        .quote_on(request(HousingType::Officetel, RentType::Jeonse), today())
        .await
        .expect("quote survives journal failure");

    assert_eq!(quote.estimate, 150.0);
}

#[tokio::test]
async fn formula_backend_skips_geocoding_and_models() {
    let journal = Arc::new(MemoryJournal::default());
    let service: EstimationService<StubGeocoder, MemoryJournal> =
        EstimationService::new(PricingBackend::Formula, journal.clone());

    let formula_request = PredictionRequest {
        area: 20.0,
        floor: 2,
        year_built: 2015,
        ..request(HousingType::Villa, RentType::Wolse)
    };
    let quote = service
        .quote_on(formula_request, today())
        .await
        .expect("formula always answers");

    assert_eq!(quote.source, QuoteSource::Formula);
    assert_eq!(quote.deposit_pred, 8521.5);
    assert_eq!(quote.monthly_pred, 47.1);
    assert_eq!(quote.estimate, 47.1);
    assert!(service.model_keys().is_empty());
    assert_eq!(journal.entries().len(), 1);
}

#[test]
fn ensemble_service_lists_loaded_keys_in_order() {
    let service = ensemble_service(
        partial_table(1.0, 1.0),
        Arc::new(StubGeocoder::at(HWAYANG)),
        Arc::new(MemoryJournal::default()),
    );

    assert_eq!(service.source(), QuoteSource::Ensemble);
    assert_eq!(
        service.model_keys(),
        vec![
            ModelKey::new(HousingType::Villa, RentType::Wolse),
            ModelKey::new(HousingType::Officetel, RentType::Jeonse),
        ]
    );
}
