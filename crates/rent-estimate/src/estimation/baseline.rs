//! Placeholder pricing formula from the first release of the API.
//!
//! Only used when the service is explicitly started with `PRICING_MODE=formula`; the
//! model path never falls back to it.

use super::domain::{HousingType, PredictionRequest, RentType};

/// Reference year the formula ages buildings against.
pub const FORMULA_REFERENCE_YEAR: i32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaEstimate {
    pub deposit: f64,
    pub monthly: f64,
}

pub fn estimate(request: &PredictionRequest) -> FormulaEstimate {
    let age = f64::from((FORMULA_REFERENCE_YEAR - request.year_built).max(0));
    let floor = f64::from(request.floor);

    let type_multiplier = match request.housing_type {
        HousingType::Officetel => 1.05,
        HousingType::Villa => 0.95,
    };

    let deposit = ((request.area * 450.0 + floor * 25.0 - age * 8.0) * type_multiplier).max(0.0);

    let monthly = match request.rent_type {
        RentType::Jeonse => 0.0,
        RentType::Wolse => {
            let low_floor_premium = f64::from((10 - request.floor).max(0)) * 1.2;
            (request.area * 1.8 + low_floor_premium + age * 0.15).max(0.0)
        }
    };

    FormulaEstimate { deposit, monthly }
}
